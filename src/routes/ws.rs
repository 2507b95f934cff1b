// WebSocket handler: pushes the sorted list on connect and after every refresh

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::aggregator::{StatusAggregator, StatusView};

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_statuses(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let aggregator = state.aggregator.clone();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_statuses(socket, aggregator).await {
            tracing::info!("Status stream error: {}", e);
        }
    })
}

async fn send_json(socket: &mut WebSocket, view: &StatusView) -> anyhow::Result<bool> {
    let json = serde_json::to_string(view)?;
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    Ok(matches!(r, Ok(Ok(()))))
}

async fn stream_statuses(
    mut socket: WebSocket,
    aggregator: Arc<StatusAggregator>,
) -> anyhow::Result<()> {
    // Subscribe before the first send so a refresh finishing in between is not missed.
    let mut rx = aggregator.subscribe();
    tracing::info!("Client connected to status stream");

    let view = aggregator.view().await;
    if !send_json(&mut socket, &view).await? {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ping_interval.tick().await;
    loop {
        tokio::select! {
            result = rx.recv() => {
                let snapshot = match result {
                    Ok(s) => s,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "status stream lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let view = StatusView::new(&snapshot, false, aggregator.next_refresh_in());
                if !send_json(&mut socket, &view).await? {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
        }
    }
    tracing::info!("Client disconnected from status stream");
    Ok(())
}
