//! Protocol errors for the application service API
//!
//! Errors are written to the homeserver as `{"errcode": ..., "message": ...}`
//! with the HTTP status carried by the error itself.

use std::fmt;

use axum::{
    extract::rejection::{BytesRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error code of an [`AppserviceError`]
///
/// The wire strings are stable. Codes this crate does not know about are
/// carried in [`ErrorCode::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    /// `M_FORBIDDEN`
    Forbidden,
    /// `M_UNKNOWN`
    Unknown,
    /// `M_UNRECOGNIZED`
    Unrecognized,
    /// `M_TOO_LARGE`
    TooLarge,
    /// `NET.MAUNIUM.NO_TRANSACTION_ID`
    NoTransactionId,
    /// `NET.MAUNIUM.NO_REQUEST_BODY`
    NoBody,
    /// `NET.MAUNIUM.INVALID_JSON`
    InvalidJson,
    /// Any other code, kept verbatim
    Custom(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::Forbidden => "M_FORBIDDEN",
            ErrorCode::Unknown => "M_UNKNOWN",
            ErrorCode::Unrecognized => "M_UNRECOGNIZED",
            ErrorCode::TooLarge => "M_TOO_LARGE",
            ErrorCode::NoTransactionId => "NET.MAUNIUM.NO_TRANSACTION_ID",
            ErrorCode::NoBody => "NET.MAUNIUM.NO_REQUEST_BODY",
            ErrorCode::InvalidJson => "NET.MAUNIUM.INVALID_JSON",
            ErrorCode::Custom(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "M_FORBIDDEN" => ErrorCode::Forbidden,
            "M_UNKNOWN" => ErrorCode::Unknown,
            "M_UNRECOGNIZED" => ErrorCode::Unrecognized,
            "M_TOO_LARGE" => ErrorCode::TooLarge,
            "NET.MAUNIUM.NO_TRANSACTION_ID" => ErrorCode::NoTransactionId,
            "NET.MAUNIUM.NO_REQUEST_BODY" => ErrorCode::NoBody,
            "NET.MAUNIUM.INVALID_JSON" => ErrorCode::InvalidJson,
            other => ErrorCode::Custom(other.to_owned()),
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::from(code.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Custom(code) => code,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Matrix protocol error answered to the homeserver
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{errcode}: {message}")]
pub struct AppserviceError {
    /// Status the error is written with; never serialized
    #[serde(skip, default = "default_status")]
    pub http_status: StatusCode,

    pub errcode: ErrorCode,

    pub message: String,
}

fn default_status() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Result type for appservice handlers
pub type Result<T> = std::result::Result<T, AppserviceError>;

impl AppserviceError {
    pub fn new<M: Into<String>>(http_status: StatusCode, errcode: ErrorCode, message: M) -> Self {
        Self {
            http_status,
            errcode,
            message: message.into(),
        }
    }

    pub fn forbidden<M: Into<String>>(message: M) -> Self {
        Self::new(StatusCode::FORBIDDEN, ErrorCode::Forbidden, message)
    }

    pub fn unknown<M: Into<String>>(message: M) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Unknown, message)
    }

    pub fn unrecognized() -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorCode::Unrecognized, "Unrecognized request")
    }

    /// A known path requested with a method it does not serve
    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::Unrecognized,
            "Unsupported method",
        )
    }

    pub fn too_large<M: Into<String>>(message: M) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::TooLarge, message)
    }

    pub fn no_transaction_id() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::NoTransactionId,
            "Missing transaction ID",
        )
    }

    pub fn no_body() -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::NoBody, "Missing request body")
    }

    pub fn invalid_json<E: fmt::Display>(err: E) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::InvalidJson,
            format!("Failed to parse body as JSON: {err}"),
        )
    }
}

impl From<serde_json::Error> for AppserviceError {
    fn from(err: serde_json::Error) -> Self {
        AppserviceError::unknown(format!("Failed to serialize response: {err}"))
    }
}

impl From<PathRejection> for AppserviceError {
    fn from(rejection: PathRejection) -> Self {
        AppserviceError::new(rejection.status(), ErrorCode::Unknown, rejection.body_text())
    }
}

impl From<BytesRejection> for AppserviceError {
    fn from(rejection: BytesRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppserviceError::too_large(rejection.body_text()),
            status => AppserviceError::new(status, ErrorCode::Unknown, rejection.body_text()),
        }
    }
}

impl IntoResponse for AppserviceError {
    fn into_response(self) -> Response {
        (self.http_status, Json(&self)).into_response()
    }
}
