//! API routes for the application service
//!
//! Only transaction pushes are served. Both the versioned path and the
//! legacy unprefixed path older homeservers use are accepted. Wrong methods,
//! unknown paths and rejected extractors all answer with a JSON error body.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{put, MethodRouter},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware::auth, server::Appservice};

/// Create the application service router
pub fn create_router(appservice: Arc<Appservice>) -> Router {
    let body_limit = appservice.config().max_request_size;

    let transaction = || -> MethodRouter<Arc<Appservice>> {
        put(handlers::put_transaction).fallback(handlers::method_not_allowed)
    };
    let missing_id = || -> MethodRouter<Arc<Appservice>> {
        put(handlers::missing_transaction_id).fallback(handlers::method_not_allowed)
    };

    Router::new()
        .route("/_matrix/app/v1/transactions/:txn_id", transaction())
        .route("/transactions/:txn_id", transaction())
        .route("/_matrix/app/v1/transactions", missing_id())
        .route("/_matrix/app/v1/transactions/", missing_id())
        .route("/transactions", missing_id())
        .route("/transactions/", missing_id())
        .route_layer(middleware::from_fn_with_state(Arc::clone(&appservice), auth))
        .fallback(handlers::unrecognized)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(appservice)
}
