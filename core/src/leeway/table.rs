//! Leeway regressions for the twenty search-object categories.
//!
//! Each category drifts downwind at `slope * U + offset` knots for a wind of
//! `U` knots, and may diverge from the downwind heading by up to
//! `divergence_deg` to either side.

use crate::prelude::{SarError, SarResult};
use serde::Serialize;

pub const SEARCH_OBJECT_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchObjectProfile {
    pub id: usize,
    pub name: &'static str,
    pub slope: f64,
    pub offset_knots: f64,
    pub divergence_deg: f64,
}

impl SearchObjectProfile {
    /// Leeway speed in knots for the observed wind speed.
    pub fn leeway_speed(&self, wind_knots: f64) -> f64 {
        if wind_knots <= 0.0 {
            return 0.0;
        }
        (self.slope * wind_knots + self.offset_knots).max(0.0)
    }
}

const fn entry(
    id: usize,
    name: &'static str,
    slope: f64,
    offset_knots: f64,
    divergence_deg: f64,
) -> SearchObjectProfile {
    SearchObjectProfile {
        id,
        name,
        slope,
        offset_knots,
        divergence_deg,
    }
}

static PROFILES: [SearchObjectProfile; SEARCH_OBJECT_COUNT] = [
    entry(0, "Person in water (PIW)", 0.011, 0.068, 30.0),
    entry(1, "Raft (4-6 person), unknown drift anker status", 0.029, 0.039, 20.0),
    entry(2, "Raft (4-6 person) with drift anker", 0.018, 0.027, 16.0),
    entry(3, "Raft (4-6 person) without drift anker", 0.038, -0.041, 20.0),
    entry(4, "Raft (15-25 person), unknown drift anker status", 0.036, -0.086, 14.0),
    entry(5, "Raft (15-25 person) with drift anker", 0.031, -0.070, 12.0),
    entry(6, "Raft (15-25 person) without drift anker", 0.039, -0.060, 12.0),
    entry(7, "Dinghy (flat bottom)", 0.034, 0.040, 22.0),
    entry(8, "Dinghy (with keel)", 0.030, 0.080, 15.0),
    entry(9, "Dinghy (capsized)", 0.017, 0.000, 15.0),
    entry(10, "Kayak with person", 0.011, 0.240, 15.0),
    entry(11, "Surfboard with person", 0.020, 0.000, 15.0),
    entry(12, "Windsurfer with person, mast and sail in water", 0.023, 0.100, 12.0),
    entry(13, "Sailboat (long keel)", 0.030, 0.000, 48.0),
    entry(14, "Sailboat (fin keel)", 0.040, 0.000, 48.0),
    entry(15, "Motorboat", 0.069, -0.080, 19.0),
    entry(16, "Fishing vessel", 0.042, 0.000, 22.0),
    entry(17, "Trawler", 0.040, 0.000, 33.0),
    entry(18, "Coaster", 0.028, 0.000, 48.0),
    entry(19, "Wreckage", 0.037, 0.020, 10.0),
];

/// Looks up the profile for a search-object id.
pub fn profile(id: i32) -> SarResult<SearchObjectProfile> {
    usize::try_from(id)
        .ok()
        .and_then(|index| PROFILES.get(index))
        .copied()
        .ok_or(SarError::InvalidSearchObject(id))
}

pub fn all_profiles() -> &'static [SearchObjectProfile] {
    &PROFILES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ids_match_positions() {
        for (index, profile) in all_profiles().iter().enumerate() {
            assert_eq!(profile.id, index);
            assert!(profile.divergence_deg > 0.0);
        }
    }

    #[test]
    fn out_of_range_ids_are_rejected() {
        assert_eq!(profile(-1), Err(SarError::InvalidSearchObject(-1)));
        assert_eq!(profile(20), Err(SarError::InvalidSearchObject(20)));
        assert!(profile(19).is_ok());
    }

    #[test]
    fn person_in_water_regression() {
        let piw = profile(0).unwrap();
        assert!((piw.leeway_speed(10.0) - 0.178).abs() < 1e-12);
        assert_eq!(piw.leeway_speed(0.0), 0.0);
    }

    #[test]
    fn negative_intercepts_clamp_at_zero() {
        let raft = profile(4).unwrap();
        assert_eq!(raft.leeway_speed(1.0), 0.0);
        assert!(raft.leeway_speed(20.0) > 0.0);
    }
}
