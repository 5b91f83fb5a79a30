use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::domain::router::PortalRouter;

/// HTTP surface of the gateway.
#[must_use]
pub fn router(portal: Arc<PortalRouter>) -> Router {
    Router::new()
        .route("/rpc/{procedure}", post(handlers::call_procedure))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(portal)
}
