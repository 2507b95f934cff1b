// GET/POST handlers: page, version, status API, manual refresh

use axum::{
    Json,
    extract::State,
    response::{Html, IntoResponse, Redirect},
};

use super::AppState;
use crate::render::render_page;
use crate::version::{NAME, VERSION};

/// GET /: server-rendered status list.
pub(super) async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.aggregator.view().await;
    Html(render_page(&view))
}

/// POST /refresh: "Refresh Now" button; refreshes then sends the browser back to the list.
pub(super) async fn refresh_form_handler(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("Manual refresh requested");
    state.aggregator.refresh().await;
    Redirect::to("/")
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/statuses: loading flag, countdown and the sorted list.
pub(super) async fn statuses_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.view().await)
}

/// POST /api/refresh: runs a refresh cycle now and reports how many sources answered.
pub(super) async fn refresh_handler(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("Manual refresh requested");
    Json(state.aggregator.refresh().await)
}
