//! The poll loop: fetch, accumulate, classify, publish, log, sleep.

use crate::config::Config;
use crate::detect::{classifier, Accumulator, Evaluation, Severity};
use crate::metrics::{MetricsSink, SEV1_GAUGE, SEV2_GAUGE, TEMPERATURE_GAUGE};
use crate::source::{FetchError, PrometheusSource, SignalSource};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{info, warn};

/// Per-signal view of one completed cycle. `reading` is `None` when the
/// fetch failed and the accumulator was held.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SignalSnapshot {
    pub name: String,
    pub reading: Option<f64>,
    pub accumulator: f64,
}

/// Full view of the latest completed cycle, served by the status API.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CycleSnapshot {
    pub timestamp: DateTime<Utc>,
    pub signals: Vec<SignalSnapshot>,
    pub temperature: f64,
    pub severity: Severity,
}

/// Handle to the latest snapshot, shared with the API layer.
pub type SharedSnapshot = Arc<RwLock<Option<CycleSnapshot>>>;

/// Owns the accumulators and drives the fixed-interval poll cycle.
///
/// Single task, no cross-cycle concurrency: a cycle's publish and log
/// steps always complete before the next tick fires. Source fetches
/// within a cycle run concurrently, each bounded by the fetch timeout.
pub struct IncidentEngine {
    sources: Vec<Box<dyn SignalSource>>,
    accumulators: Vec<Accumulator>,
    threshold: f64,
    cap: f64,
    fetch_timeout: Duration,
    sink: Arc<dyn MetricsSink>,
    snapshot: SharedSnapshot,
}

impl IncidentEngine {
    pub fn new(
        threshold: f64,
        cap: f64,
        fetch_timeout: Duration,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            sources: Vec::new(),
            accumulators: Vec::new(),
            threshold,
            cap,
            fetch_timeout,
            sink,
            snapshot: Arc::new(RwLock::new(None)),
        }
    }

    /// Wire the engine from config, binding one Prometheus query per signal.
    pub fn from_config(config: &Config, sink: Arc<dyn MetricsSink>) -> Self {
        let mut engine = Self::new(
            config.threshold,
            config.temperature_cap,
            config.fetch_timeout(),
            sink,
        );
        for signal in &config.signals {
            engine.add_signal(
                Accumulator::new(&signal.name, config.decay_for(signal)),
                Box::new(PrometheusSource::new(
                    &config.prometheus_url,
                    &signal.query,
                    config.fetch_timeout(),
                )),
            );
        }
        engine
    }

    pub fn add_signal(&mut self, accumulator: Accumulator, source: Box<dyn SignalSource>) {
        self.accumulators.push(accumulator);
        self.sources.push(source);
    }

    pub fn snapshot_handle(&self) -> SharedSnapshot {
        Arc::clone(&self.snapshot)
    }

    /// Run one poll cycle and return its snapshot.
    pub async fn run_cycle(&mut self) -> CycleSnapshot {
        let timeout = self.fetch_timeout;
        let fetches = self.sources.iter().map(|source| async move {
            match tokio::time::timeout(timeout, source.fetch()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(timeout)),
            }
        });
        let outcomes = futures::future::join_all(fetches).await;

        let mut signals = Vec::with_capacity(self.accumulators.len());
        for (accumulator, outcome) in self.accumulators.iter_mut().zip(outcomes) {
            let reading = match outcome {
                Ok(reading) => {
                    accumulator.update(reading);
                    Some(reading)
                }
                Err(e) => {
                    // Unavailable is not quiet: hold, don't decay
                    warn!(
                        signal = %accumulator.name(),
                        "fetch failed, holding accumulator: {}", e
                    );
                    None
                }
            };
            signals.push(SignalSnapshot {
                name: accumulator.name().to_string(),
                reading,
                accumulator: accumulator.value(),
            });
        }

        let eval = classifier::evaluate(&self.accumulators, self.threshold, self.cap);
        self.publish(&eval);
        self.log_cycle(&signals, &eval);

        let snapshot = CycleSnapshot {
            timestamp: Utc::now(),
            signals,
            temperature: eval.temperature,
            severity: eval.severity,
        };
        *self
            .snapshot
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());
        snapshot
    }

    /// All three gauges are written every cycle, so asserting one tier
    /// always clears the other.
    fn publish(&self, eval: &Evaluation) {
        let (sev1, sev2) = match eval.severity {
            Severity::Sev1 => (1.0, 0.0),
            Severity::Sev2 => (0.0, 1.0),
            Severity::None => (0.0, 0.0),
        };
        self.sink.publish(TEMPERATURE_GAUGE, eval.temperature);
        self.sink.publish(SEV1_GAUGE, sev1);
        self.sink.publish(SEV2_GAUGE, sev2);
    }

    fn log_cycle(&self, signals: &[SignalSnapshot], eval: &Evaluation) {
        let readings: Vec<String> = signals
            .iter()
            .map(|s| match s.reading {
                Some(r) => format!("{}={} acc={}", s.name, r, s.accumulator),
                None => format!("{}=held acc={}", s.name, s.accumulator),
            })
            .collect();
        info!(
            temperature = eval.temperature,
            severity = %eval.severity,
            signals = %readings.join(", "),
            "Cycle complete"
        );
        match eval.severity {
            Severity::Sev1 => warn!(
                temperature = eval.temperature,
                "Sev 1 incident - all signals have anomalies"
            ),
            Severity::Sev2 => warn!(
                temperature = eval.temperature,
                "Sev 2 incident - one signal has anomalies"
            ),
            Severity::None => {}
        }
    }

    /// Run cycles forever on a fixed period. Never returns.
    pub async fn run(mut self, period: Duration) {
        info!(period_secs = period.as_secs(), "Incident engine started");
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.run_cycle().await;
        }
    }
}
