//! Pull-based gauge publication -- last-write-wins, scraped over HTTP.

use prometheus::{Gauge, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TEMPERATURE_GAUGE: &str = "incident_temperature";
pub const SEV1_GAUGE: &str = "incident_sev1";
pub const SEV2_GAUGE: &str = "incident_sev2";

/// Write-only sink for scalar gauges. Idempotent per name; an external
/// reader may poll the published values at any time.
pub trait MetricsSink: Send + Sync {
    fn publish(&self, name: &str, value: f64);
}

/// Gauge registry backing the `/metrics` endpoint.
///
/// Clones share the same underlying registry, so the engine publishes
/// through one handle while the API scrapes through another.
#[derive(Clone)]
pub struct GaugeRegistry {
    registry: Registry,
    gauges: Arc<Mutex<HashMap<String, Gauge>>>,
}

impl Default for GaugeRegistry {
    fn default() -> Self {
        Self {
            registry: Registry::new(),
            gauges: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl GaugeRegistry {
    /// Registry pre-seeded with the incident gauges, all at zero.
    pub fn for_incidents() -> Self {
        let registry = Self::default();
        registry.register(
            TEMPERATURE_GAUGE,
            "Current capped sum of anomaly accumulators",
        );
        registry.register(SEV1_GAUGE, "Sev 1 incident - all signals active");
        registry.register(SEV2_GAUGE, "Sev 2 incident - one signal active");
        registry
    }

    /// Create and register a named gauge. A name already registered keeps
    /// its first registration.
    pub fn register(&self, name: &str, help: &str) {
        let mut gauges = self.gauges.lock().unwrap_or_else(|e| e.into_inner());
        if gauges.contains_key(name) {
            return;
        }
        let gauge = match Gauge::new(name, help) {
            Ok(g) => g,
            Err(e) => {
                tracing::warn!(gauge = name, "failed to create gauge: {}", e);
                return;
            }
        };
        if let Err(e) = self.registry.register(Box::new(gauge.clone())) {
            tracing::warn!(gauge = name, "failed to register gauge: {}", e);
            return;
        }
        gauges.insert(name.to_string(), gauge);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let gauges = self.gauges.lock().unwrap_or_else(|e| e.into_inner());
        gauges.get(name).map(Gauge::get)
    }

    /// Render all gauges in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = String::new();
        if let Err(e) = encoder.encode_utf8(&self.registry.gather(), &mut buffer) {
            tracing::warn!("metrics encoding failed: {}", e);
        }
        buffer
    }
}

impl MetricsSink for GaugeRegistry {
    fn publish(&self, name: &str, value: f64) {
        {
            let gauges = self.gauges.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(gauge) = gauges.get(name) {
                gauge.set(value);
                return;
            }
        }
        // First publish to an unknown name registers it on the fly
        self.register(name, name);
        let gauges = self.gauges.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(gauge) = gauges.get(name) {
            gauge.set(value);
        }
    }
}
