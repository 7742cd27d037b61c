//! Signal sources -- external producers of per-cycle anomaly counts.

pub mod prometheus;

pub use prometheus::PrometheusSource;

use std::time::Duration;
use thiserror::Error;

/// Why a source failed to produce a reading this cycle.
///
/// A fetch failure is not a zero reading: the engine holds the affected
/// accumulator instead of decaying it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metrics backend returned status {0}")]
    BadStatus(reqwest::StatusCode),

    #[error("query returned no samples")]
    Empty,

    #[error("unusable sample value: {0}")]
    Parse(String),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// A producer of the current anomaly count for one monitored signal.
#[async_trait::async_trait]
pub trait SignalSource: Send + Sync {
    /// Fetch the signal's current anomaly count. Must be non-negative
    /// and finite on success.
    async fn fetch(&self) -> Result<f64, FetchError>;
}
