use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::*;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/gpia", get(handle_gpia))
        .route("/cert", get(handle_cert))
        .route("/info", get(handle_info))
        .route("/health", get(handle_health))
        .fallback(handle_unknown)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
