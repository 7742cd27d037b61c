//! Per-signal running score of anomaly evidence.

/// Accumulates anomaly counts for one monitored signal, decaying toward
/// zero on quiet cycles.
///
/// The score is never capped here; capping happens only at the combined
/// temperature level in the classifier.
#[derive(Debug, Clone)]
pub struct Accumulator {
    name: String,
    value: f64,
    decay_step: f64,
}

impl Accumulator {
    /// Create a fresh accumulator starting at zero.
    pub fn new(name: impl Into<String>, decay_step: f64) -> Self {
        Self {
            name: name.into(),
            value: 0.0,
            decay_step,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether this signal currently contributes evidence.
    pub fn is_active(&self) -> bool {
        self.value > 0.0
    }

    /// Fold one cycle's reading into the score.
    ///
    /// A positive reading adds in full; a zero reading decays the score by
    /// `decay_step`, clamped at zero. Callers must filter out unavailable
    /// readings before this point -- a failed fetch holds the score, it does
    /// not decay it.
    pub fn update(&mut self, reading: f64) {
        if reading > 0.0 {
            self.value += reading;
        } else {
            self.value = (self.value - self.decay_step).max(0.0);
        }
    }
}
