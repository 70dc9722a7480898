//! Middleware components for the application service API

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{server::Appservice, AppserviceError};

#[derive(Debug, Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

/// The homeserver token from `?access_token=` or an `Authorization: Bearer` header
fn presented_token(req: &Request) -> Option<String> {
    if let Ok(Query(TokenQuery {
        access_token: Some(token),
    })) = Query::<TokenQuery>::try_from_uri(req.uri())
    {
        return Some(token);
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Reject requests that do not carry the configured homeserver token
pub async fn auth(
    State(appservice): State<Arc<Appservice>>,
    req: Request,
    next: Next,
) -> Response {
    debug!("🔒 Authenticating request");
    let token = presented_token(&req);
    if !appservice.is_authorized(token.as_deref()) {
        warn!("🚫 Rejected {} {}: bad homeserver token", req.method(), req.uri().path());
        return AppserviceError::forbidden("Bad token supplied").into_response();
    }
    next.run(req).await
}
