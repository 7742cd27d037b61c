//! sevwatch -- anomaly accumulation and incident severity monitor.
//!
//! Polls anomaly-count signals from a metrics backend on a fixed interval,
//! accumulates per-signal evidence with decay-on-quiet, combines the
//! accumulators into a bounded incident temperature, and publishes a
//! two-tier severity classification as scrapeable gauges.

pub mod api;
pub mod config;
pub mod detect;
pub mod metrics;
pub mod source;

use anyhow::Result;
use std::sync::Arc;

/// Start the sevwatch daemon: the poll loop plus the metrics/status API.
pub async fn serve(bind: &str, config: config::Config) -> Result<()> {
    let registry = metrics::GaugeRegistry::for_incidents();

    let engine = detect::IncidentEngine::from_config(&config, Arc::new(registry.clone()));
    let snapshot = engine.snapshot_handle();

    let period = config.poll_interval();
    tokio::spawn(async move {
        engine.run(period).await;
    });

    let state = api::state::AppState { registry, snapshot };
    let app = api::router(state);

    let addr: std::net::SocketAddr = bind.parse()?;
    tracing::info!(%addr, "sevwatch listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
