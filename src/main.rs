use anyhow::Result;
use status_status::*;
use std::sync::Arc;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let status_repo = status_repo::StatusRepo::new(
        app_config
            .refresh
            .request_timeout_secs
            .map(Duration::from_secs),
    )?;
    let aggregator = Arc::new(aggregator::StatusAggregator::new(
        status_repo,
        aggregator::AggregatorConfig {
            sources: app_config.sources.status_pages.clone(),
            mode: app_config.refresh.mode,
            interval: Duration::from_secs(app_config.refresh.interval_secs),
            broadcast_capacity: app_config.publishing.broadcast_capacity,
        },
    ));
    tracing::info!(
        sources = aggregator.sources().len(),
        interval_secs = app_config.refresh.interval_secs,
        mode = ?app_config.refresh.mode,
        "Status aggregator configured"
    );

    let scheduler = scheduler::RefreshScheduler::spawn(aggregator.clone());

    let app = routes::app(aggregator);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    scheduler.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
