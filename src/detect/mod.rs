//! Anomaly evidence accumulation and incident severity classification.

pub mod accumulator;
pub mod classifier;
pub mod engine;

pub use accumulator::Accumulator;
pub use classifier::{evaluate, Evaluation};
pub use engine::IncidentEngine;

/// Incident severity tiers.
///
/// `Sev1` signals correlated degradation across independent signals;
/// `Sev2` signals isolated degradation in a single signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Sev2,
    Sev1,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::None => write!(f, "none"),
            Severity::Sev2 => write!(f, "sev2"),
            Severity::Sev1 => write!(f, "sev1"),
        }
    }
}
