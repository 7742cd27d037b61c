//! Static configuration surface -- loaded once at startup from TOML.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Top-level daemon configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Temperature at or above which an incident is asserted.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Upper bound applied to the summed accumulator temperature.
    #[serde(default = "default_cap")]
    pub temperature_cap: f64,

    /// Amount subtracted from an accumulator on a quiet cycle.
    /// Individual signals may override this.
    #[serde(default = "default_decay")]
    pub decay_step: f64,

    /// Seconds between poll cycles.
    #[serde(default = "default_interval")]
    pub poll_interval_secs: u64,

    /// Per-source fetch timeout in seconds. A hung backend costs at most
    /// this much per cycle; the source is treated as failed and held.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Base URL of the metrics backend queried for anomaly counts.
    #[serde(default = "default_prometheus_url")]
    pub prometheus_url: String,

    /// Monitored signals, one accumulator each.
    #[serde(default)]
    pub signals: Vec<SignalConfig>,
}

/// One monitored signal: a named instant query against the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalConfig {
    pub name: String,
    pub query: String,
    pub decay_step: Option<f64>,
}

fn default_threshold() -> f64 {
    10.0
}

fn default_cap() -> f64 {
    20.0
}

fn default_decay() -> f64 {
    5.0
}

fn default_interval() -> u64 {
    5
}

fn default_fetch_timeout() -> u64 {
    4
}

fn default_prometheus_url() -> String {
    "http://localhost:9090".to_string()
}

impl Default for Config {
    /// Reference deployment: the two energy anomaly-count series.
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            temperature_cap: default_cap(),
            decay_step: default_decay(),
            poll_interval_secs: default_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
            prometheus_url: default_prometheus_url(),
            signals: vec![
                SignalConfig {
                    name: "energy_consumption".to_string(),
                    query: "energy_consumption_anomaly_count".to_string(),
                    decay_step: None,
                },
                SignalConfig {
                    name: "energy_price".to_string(),
                    query: "energy_price_anomaly_count".to_string(),
                    decay_step: None,
                },
            ],
        }
    }
}

impl Config {
    /// Load and validate a config file. A missing `signals` table falls back
    /// to the reference deployment's two energy signals.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        if config.signals.is_empty() {
            config.signals = Config::default().signals;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold <= 0.0 || !self.threshold.is_finite() {
            bail!("threshold must be a positive number, got {}", self.threshold);
        }
        if self.temperature_cap <= 0.0 || !self.temperature_cap.is_finite() {
            bail!(
                "temperature_cap must be a positive number, got {}",
                self.temperature_cap
            );
        }
        if self.decay_step <= 0.0 || !self.decay_step.is_finite() {
            bail!("decay_step must be a positive number, got {}", self.decay_step);
        }
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be at least 1");
        }
        if self.fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be at least 1");
        }
        if self.signals.is_empty() {
            bail!("at least one [[signals]] entry is required");
        }
        for signal in &self.signals {
            if signal.name.is_empty() {
                bail!("signal name must not be empty");
            }
            if signal.query.is_empty() {
                bail!("signal '{}' has an empty query", signal.name);
            }
            if let Some(decay) = signal.decay_step {
                if decay <= 0.0 || !decay.is_finite() {
                    bail!(
                        "signal '{}' decay_step must be a positive number, got {}",
                        signal.name,
                        decay
                    );
                }
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Effective decay step for one signal (per-signal override or global).
    pub fn decay_for(&self, signal: &SignalConfig) -> f64 {
        signal.decay_step.unwrap_or(self.decay_step)
    }
}
