pub mod calculator;
pub mod datum;
pub mod datum_line;
pub mod drift;
pub mod effort;
pub mod projection;
pub mod search_box;

pub use calculator::{
    apply_drift_to_point, compute, datum_line, datum_point, rapid_response, simple_sar,
    SarCalculator,
};
pub use drift::DriftTracks;
pub use effort::{allocate_effort, compute_effort_allocation, required_search_hours, track_spacing};
pub use projection::{default_offsets, FutureProjection};
