// Shared test helpers: fake status pages on a mockito server

#![allow(dead_code)]

use mockito::{Mock, ServerGuard};
use status_status::aggregator::{AggregatorConfig, StatusAggregator};
use status_status::config::RefreshMode;
use status_status::status_repo::StatusRepo;
use tokio::time::Duration;

pub const INTERVAL: Duration = Duration::from_secs(60);

pub fn status_body(name: &str, indicator: &str, description: &str) -> String {
    serde_json::json!({
        "page": {
            "id": "kctbh9vrtdwd",
            "name": name,
            "url": format!("https://{}.example.com", name.to_lowercase()),
            "time_zone": "Etc/UTC",
            "updated_at": "2026-10-19T06:00:00.000Z"
        },
        "status": {
            "indicator": indicator,
            "description": description
        }
    })
    .to_string()
}

/// Serves `status_body(name, indicator, ..)` at `/<slug>/api/v2/status.json`.
pub async fn mock_page(server: &mut ServerGuard, slug: &str, name: &str, indicator: &str) -> Mock {
    server
        .mock("GET", format!("/{}/api/v2/status.json", slug).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(status_body(name, indicator, "All Systems Operational"))
        .create_async()
        .await
}

pub fn source(server: &ServerGuard, slug: &str) -> String {
    format!("{}/{}/", server.url(), slug)
}

pub fn aggregator(sources: Vec<String>, mode: RefreshMode) -> StatusAggregator {
    StatusAggregator::new(
        StatusRepo::new(Some(Duration::from_secs(5))).unwrap(),
        AggregatorConfig {
            sources,
            mode,
            interval: INTERVAL,
            broadcast_capacity: 8,
        },
    )
}
