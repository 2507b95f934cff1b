// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::StatusAggregator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) aggregator: Arc<StatusAggregator>,
}

pub fn app(aggregator: Arc<StatusAggregator>) -> Router {
    let state = AppState { aggregator };
    Router::new()
        .route("/", get(http::index_handler)) // GET /
        .route("/refresh", post(http::refresh_form_handler)) // POST /refresh (HTML form)
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/statuses", get(http::statuses_handler)) // GET /api/statuses
        .route("/api/refresh", post(http::refresh_handler)) // POST /api/refresh
        .route("/ws/statuses", get(ws::ws_statuses)) // WS /ws/statuses
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
