//! Request handlers for the application service API
//!
//! Every response body is a JSON object: `{}` for a bare success, the
//! serialized payload for data, or an [`AppserviceError`] body.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{server::Appservice, AppserviceError, EventList, Result};

/// Answer with status 200 and the literal body `{}`
pub fn write_blank_ok() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        "{}",
    )
        .into_response()
}

/// Answer with status 200 and `data` as JSON
pub fn respond<T: Serialize>(data: &T) -> Result<Response> {
    let body = serde_json::to_vec(data)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// `PUT /_matrix/app/v1/transactions/{txnId}`
pub async fn put_transaction(
    State(appservice): State<Arc<Appservice>>,
    txn_id: std::result::Result<Path<String>, PathRejection>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Response> {
    let Path(txn_id) = txn_id?;
    let body = body.map_err(|rejection| {
        warn!("❌ Transaction {} body rejected: {}", txn_id, rejection.body_text());
        AppserviceError::from(rejection)
    })?;
    if txn_id.is_empty() {
        return Err(AppserviceError::no_transaction_id());
    }
    if body.is_empty() {
        return Err(AppserviceError::no_body());
    }

    let transaction: EventList = serde_json::from_slice(&body).map_err(|err| {
        warn!("❌ Transaction {} has an invalid body: {}", txn_id, err);
        AppserviceError::invalid_json(err)
    })?;

    debug!(
        "📥 Received transaction {} with {} events",
        txn_id,
        transaction.events.len()
    );
    appservice.handle_transaction(&txn_id, transaction);
    Ok(write_blank_ok())
}

/// A transaction path without an ID
pub async fn missing_transaction_id() -> AppserviceError {
    AppserviceError::no_transaction_id()
}

/// A transaction path requested with a method other than `PUT`
pub async fn method_not_allowed() -> AppserviceError {
    AppserviceError::method_not_allowed()
}

/// Fallback for every unrouted request
pub async fn unrecognized() -> AppserviceError {
    AppserviceError::unrecognized()
}
