// Aggregator tests against fake status pages: upsert, failure isolation, replace/merge, ordering

mod common;

use common::{INTERVAL, aggregator, mock_page, source, status_body};
use status_status::aggregator::{AggregatorConfig, Phase, StatusAggregator};
use status_status::config::RefreshMode;
use status_status::models::{Indicator, RefreshSummary};
use status_status::status_repo::StatusRepo;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, sleep};

#[tokio::test]
async fn refresh_inserts_one_entry_per_successful_page() {
    let mut server = mockito::Server::new_async().await;
    let _github = mock_page(&mut server, "github", "GitHub", "none").await;
    let _figma = mock_page(&mut server, "figma", "Figma", "major").await;
    let agg = aggregator(
        vec![source(&server, "github"), source(&server, "figma")],
        RefreshMode::Replace,
    );

    let summary = agg.refresh().await;
    assert_eq!(
        summary,
        RefreshSummary {
            succeeded: 2,
            failed: 0
        }
    );

    let snapshot = agg.snapshot().await;
    assert_eq!(snapshot.len(), 2);
    let figma = snapshot.get("Figma").expect("keyed by page.name");
    assert_eq!(figma.indicator, Indicator::Major);
    assert_eq!(figma.url, "https://figma.example.com");
    assert_eq!(figma.description, "All Systems Operational");
    assert!(snapshot.refreshed_at.is_some());
}

#[tokio::test]
async fn render_order_is_alphabetical_not_source_order() {
    let mut server = mockito::Server::new_async().await;
    let _github = mock_page(&mut server, "github", "GitHub", "none").await;
    let _figma = mock_page(&mut server, "figma", "Figma", "major").await;
    let _npm = mock_page(&mut server, "npm", "npm", "minor").await;
    let agg = aggregator(
        vec![
            source(&server, "github"),
            source(&server, "npm"),
            source(&server, "figma"),
        ],
        RefreshMode::Replace,
    );
    agg.refresh().await;

    let view = agg.view().await;
    let names: Vec<&str> = view.statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Figma", "GitHub", "npm"]);
    assert!(view.statuses[0].indicator.is_emphasized());
    assert!(!view.statuses[1].indicator.is_emphasized());
}

#[tokio::test]
async fn one_failing_page_leaves_the_others_populated() {
    let mut server = mockito::Server::new_async().await;
    let mut mocks = Vec::new();
    let mut sources = Vec::new();
    for i in 0..12 {
        let slug = format!("page{}", i);
        mocks.push(mock_page(&mut server, &slug, &format!("Service {:02}", i), "none").await);
        sources.push(source(&server, &slug));
    }
    // Nothing mocked here; mockito answers 501.
    sources.push(source(&server, "broken"));
    let agg = aggregator(sources, RefreshMode::Replace);

    let summary = agg.refresh().await;
    assert_eq!(summary.succeeded, 12);
    assert_eq!(summary.failed, 1);
    assert_eq!(agg.snapshot().await.len(), 12);
}

#[tokio::test]
async fn unreachable_and_malformed_pages_are_skipped() {
    let mut server = mockito::Server::new_async().await;
    let _github = mock_page(&mut server, "github", "GitHub", "none").await;
    let _garbage = server
        .mock("GET", "/garbage/api/v2/status.json")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;
    let agg = aggregator(
        vec![
            source(&server, "github"),
            source(&server, "garbage"),
            "http://127.0.0.1:1".to_string(),
        ],
        RefreshMode::Replace,
    );

    let summary = agg.refresh().await;
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 2);
    let snapshot = agg.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.get("GitHub").is_some());
}

#[tokio::test]
async fn later_cycle_wins_for_the_same_name() {
    let mut server = mockito::Server::new_async().await;
    let first = mock_page(&mut server, "github", "GitHub", "none").await;
    let agg = aggregator(vec![source(&server, "github")], RefreshMode::Merge);
    agg.refresh().await;
    assert_eq!(
        agg.snapshot().await.get("GitHub").unwrap().indicator,
        Indicator::None
    );

    first.remove_async().await;
    let _second = mock_page(&mut server, "github", "GitHub", "critical").await;
    agg.refresh().await;
    let snapshot = agg.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("GitHub").unwrap().indicator, Indicator::Critical);
}

#[tokio::test]
async fn replace_mode_drops_pages_that_fail_next_cycle() {
    let mut server = mockito::Server::new_async().await;
    let _github = mock_page(&mut server, "github", "GitHub", "none").await;
    let figma = mock_page(&mut server, "figma", "Figma", "none").await;
    let agg = aggregator(
        vec![source(&server, "github"), source(&server, "figma")],
        RefreshMode::Replace,
    );
    agg.refresh().await;
    assert_eq!(agg.snapshot().await.len(), 2);

    figma.remove_async().await;
    agg.refresh().await;
    let snapshot = agg.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.get("Figma").is_none());
}

#[tokio::test]
async fn merge_mode_keeps_last_known_value_of_failed_pages() {
    let mut server = mockito::Server::new_async().await;
    let _github = mock_page(&mut server, "github", "GitHub", "none").await;
    let figma = mock_page(&mut server, "figma", "Figma", "minor").await;
    let agg = aggregator(
        vec![source(&server, "github"), source(&server, "figma")],
        RefreshMode::Merge,
    );
    agg.refresh().await;

    figma.remove_async().await;
    let summary = agg.refresh().await;
    assert_eq!(summary.failed, 1);
    let snapshot = agg.snapshot().await;
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("Figma").unwrap().indicator, Indicator::Minor);
}

#[tokio::test]
async fn loading_until_first_refresh_completes() {
    let mut server = mockito::Server::new_async().await;
    let _github = mock_page(&mut server, "github", "GitHub", "none").await;
    let agg = aggregator(vec![source(&server, "github")], RefreshMode::Replace);

    assert_eq!(agg.phase(), Phase::Loading);
    let before = agg.view().await;
    assert!(before.loading);
    assert_eq!(before.next_refresh_secs, INTERVAL.as_secs());
    assert!(agg.snapshot().await.is_empty());

    agg.refresh().await;
    assert_eq!(agg.phase(), Phase::Idle);
    let view = agg.view().await;
    assert!(!view.loading);
    assert!(view.next_refresh_secs > 0 && view.next_refresh_secs <= 60);
}

#[tokio::test]
async fn refresh_publishes_snapshot_to_subscribers() {
    let mut server = mockito::Server::new_async().await;
    let _github = mock_page(&mut server, "github", "GitHub", "none").await;
    let agg = aggregator(vec![source(&server, "github")], RefreshMode::Replace);
    let mut rx = agg.subscribe();

    agg.refresh().await;
    let snapshot = rx.recv().await.expect("snapshot broadcast");
    assert!(snapshot.get("GitHub").is_some());
    assert_eq!(agg.refreshes_total(), 1);
}

#[tokio::test]
async fn concurrent_refreshes_run_one_after_another() {
    let mut server = mockito::Server::new_async().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let _github = server
        .mock("GET", "/github/api/v2/status.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |_| {
            let indicator = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                "none"
            } else {
                "critical"
            };
            status_body("GitHub", indicator, "Partial outage").into_bytes()
        })
        .create_async()
        .await;
    let agg = aggregator(vec![source(&server, "github")], RefreshMode::Replace);
    let mut rx = agg.subscribe();

    let (first, second) = tokio::join!(agg.refresh(), agg.refresh());
    assert_eq!(first.succeeded, 1);
    assert_eq!(second.succeeded, 1);
    assert_eq!(agg.refreshes_total(), 2);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    // Published in cycle order; the second cycle's data is what remains.
    let published_first = rx.recv().await.unwrap();
    let published_second = rx.recv().await.unwrap();
    assert_eq!(
        published_first.get("GitHub").unwrap().indicator,
        Indicator::None
    );
    assert_eq!(
        published_second.get("GitHub").unwrap().indicator,
        Indicator::Critical
    );
    assert_eq!(
        agg.snapshot().await.get("GitHub").unwrap().indicator,
        Indicator::Critical
    );
    assert_eq!(agg.phase(), Phase::Idle);
}

/// Aggregator over one source that accepts connections but never answers.
async fn silent_aggregator() -> (tokio::net::TcpListener, Arc<StatusAggregator>) {
    let silent = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let source = format!("http://{}/", silent.local_addr().unwrap());
    let agg = StatusAggregator::new(
        StatusRepo::new(Some(Duration::from_secs(1))).unwrap(),
        AggregatorConfig {
            sources: vec![source],
            mode: RefreshMode::Merge,
            interval: INTERVAL,
            broadcast_capacity: 8,
        },
    );
    (silent, Arc::new(agg))
}

#[tokio::test]
async fn cancelled_refresh_returns_to_idle() {
    let (_silent, agg) = silent_aggregator().await;
    let summary = agg.refresh().await;
    assert_eq!(summary.failed, 1);
    assert_eq!(agg.phase(), Phase::Idle);

    let in_flight = tokio::spawn({
        let agg = agg.clone();
        async move { agg.refresh().await }
    });
    sleep(Duration::from_millis(200)).await;
    assert_eq!(agg.phase(), Phase::Loading);

    in_flight.abort();
    assert!(in_flight.await.unwrap_err().is_cancelled());
    assert_eq!(agg.phase(), Phase::Idle);
    assert!(!agg.view().await.loading);
    assert_eq!(agg.refreshes_total(), 1);
}

#[tokio::test]
async fn cancelled_first_refresh_stays_loading() {
    let (_silent, agg) = silent_aggregator().await;

    let in_flight = tokio::spawn({
        let agg = agg.clone();
        async move { agg.refresh().await }
    });
    sleep(Duration::from_millis(200)).await;
    in_flight.abort();
    assert!(in_flight.await.unwrap_err().is_cancelled());

    assert_eq!(agg.phase(), Phase::Loading);
    assert_eq!(agg.refreshes_total(), 0);
    assert!(agg.snapshot().await.refreshed_at.is_none());
}
