//! Core search-and-rescue planning library.
//!
//! Drift is integrated along rhumb lines from the last known position to the
//! commence search start, datums and their uncertainty circles are derived
//! from the drift, and search areas are built around them. Every operation
//! is a pure function of its input; `SarCalculator` adds logging and counters.

pub mod geo;
pub mod leeway;
pub mod prelude;
pub mod processing;
pub mod sar_interface;
pub mod telemetry;

pub use geo::GeoPosition;
pub use prelude::{ErrorKind, SarError, SarResult};
pub use processing::{FutureProjection, SarCalculator};
pub use sar_interface::{SarInput, SarOperation, SarOutcome};
