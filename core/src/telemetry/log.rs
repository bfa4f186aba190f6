use crate::prelude::SarError;
use crate::sar_interface::SarOutcome;
use log::{info, warn};

pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    pub fn record_failure(&self, label: &str, error: &SarError) {
        warn!("{} failed ({:?}): {}", label, error.kind(), error);
    }

    pub fn record_outcome(&self, outcome: &SarOutcome) {
        let polygon = outcome.search_polygon();
        info!(
            "datum {} with {} circles, search area of {} vertices",
            outcome.datum(),
            outcome.circles().len(),
            polygon.len()
        );
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
