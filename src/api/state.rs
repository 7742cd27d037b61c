use crate::detect::engine::SharedSnapshot;
use crate::metrics::GaugeRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: GaugeRegistry,
    pub snapshot: SharedSnapshot,
}
