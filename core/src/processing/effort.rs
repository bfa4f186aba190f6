use crate::prelude::{SarError, SarResult};
use crate::sar_interface::{EffortAllocationInput, EffortAllocationResult};
use std::collections::BTreeMap;

fn check_positive(label: &str, value: f64) -> SarResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SarError::invalid(format!("{} must be positive, got {}", label, value)))
    }
}

fn check_ground_speed(ground_speed_kn: f64) -> SarResult<()> {
    if !ground_speed_kn.is_finite() || ground_speed_kn < 0.0 {
        return Err(SarError::invalid(format!(
            "ground speed must be a non-negative number of knots, got {}",
            ground_speed_kn
        )));
    }
    if ground_speed_kn == 0.0 {
        return Err(SarError::ArithmeticDegenerate(
            "ground speed of zero covers no area".into(),
        ));
    }
    Ok(())
}

/// Track spacing S = W * (-5/8 * ln(1 - PoD))^(-5/7).
pub fn track_spacing(sweep_width_nm: f64, desired_pod: f64) -> SarResult<f64> {
    check_positive("sweep width", sweep_width_nm)?;
    if !(desired_pod > 0.0 && desired_pod < 1.0) {
        return Err(SarError::invalid(format!(
            "probability of detection must lie strictly between 0 and 1, got {}",
            desired_pod
        )));
    }
    let coverage_term = -5.0 / 8.0 * (1.0 - desired_pod).ln();
    Ok(sweep_width_nm * coverage_term.powf(-5.0 / 7.0))
}

pub fn compute_effort_allocation(
    input: &EffortAllocationInput,
) -> SarResult<EffortAllocationResult> {
    let spacing = track_spacing(input.sweep_width_nm, input.desired_pod)?;
    check_ground_speed(input.ground_speed_kn)?;
    if !(input.search_time_hours.is_finite() && input.search_time_hours >= 0.0) {
        return Err(SarError::invalid(format!(
            "search time must be non-negative, got {} h",
            input.search_time_hours
        )));
    }

    let track_length_nm = input.ground_speed_kn * input.search_time_hours;
    Ok(EffortAllocationResult {
        track_spacing_nm: spacing,
        effective_area_nm2: spacing * track_length_nm,
        coverage_factor: input.sweep_width_nm / spacing,
        track_length_nm,
    })
}

/// Allocates effort for several search units; the first failing unit aborts
/// the whole allocation.
pub fn allocate_effort<K: Ord + Clone>(
    units: &BTreeMap<K, EffortAllocationInput>,
) -> SarResult<BTreeMap<K, EffortAllocationResult>> {
    units
        .iter()
        .map(|(key, input)| Ok((key.clone(), compute_effort_allocation(input)?)))
        .collect()
}

/// Hours a unit needs to sweep `area_nm2` at the given spacing and speed.
pub fn required_search_hours(
    area_nm2: f64,
    track_spacing_nm: f64,
    ground_speed_kn: f64,
) -> SarResult<f64> {
    if !(area_nm2.is_finite() && area_nm2 >= 0.0) {
        return Err(SarError::invalid(format!("search area must be non-negative, got {}", area_nm2)));
    }
    check_positive("track spacing", track_spacing_nm)?;
    check_ground_speed(ground_speed_kn)?;
    Ok(area_nm2 / (track_spacing_nm * ground_speed_kn))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pod: f64, speed: f64) -> EffortAllocationInput {
        EffortAllocationInput {
            sweep_width_nm: 1.0,
            desired_pod: pod,
            ground_speed_kn: speed,
            search_time_hours: 2.0,
        }
    }

    #[test]
    fn spacing_matches_reference_value() {
        let s = track_spacing(1.0, 0.79).unwrap();
        let expected = (-5.0 / 8.0 * 0.21_f64.ln()).powf(-5.0 / 7.0);
        assert!((s - expected).abs() < 1e-12);
        assert!((s - 1.0179).abs() < 1e-3);
    }

    #[test]
    fn higher_pod_needs_tighter_spacing() {
        let loose = track_spacing(1.0, 0.5).unwrap();
        let tight = track_spacing(1.0, 0.9).unwrap();
        assert!(tight < loose);
    }

    #[test]
    fn pod_bounds_are_exclusive() {
        assert!(matches!(track_spacing(1.0, 0.0), Err(SarError::InvalidInput(_))));
        assert!(matches!(track_spacing(1.0, 1.0), Err(SarError::InvalidInput(_))));
        assert!(matches!(track_spacing(0.0, 0.5), Err(SarError::InvalidInput(_))));
    }

    #[test]
    fn allocation_reports_area_and_coverage() {
        let result = compute_effort_allocation(&input(0.79, 10.0)).unwrap();
        assert!((result.track_length_nm - 20.0).abs() < 1e-12);
        assert!((result.effective_area_nm2 - result.track_spacing_nm * 20.0).abs() < 1e-9);
        assert!((result.coverage_factor - 1.0 / result.track_spacing_nm).abs() < 1e-12);
        assert!((result.area_side_nm().powi(2) - result.effective_area_nm2).abs() < 1e-9);
    }

    #[test]
    fn ground_speed_zero_and_negative_are_distinct_failures() {
        assert!(matches!(
            compute_effort_allocation(&input(0.5, 0.0)),
            Err(SarError::ArithmeticDegenerate(_))
        ));
        assert!(matches!(
            compute_effort_allocation(&input(0.5, -3.0)),
            Err(SarError::InvalidInput(_))
        ));
    }

    #[test]
    fn units_are_allocated_in_key_order() {
        let mut units = BTreeMap::new();
        units.insert("helicopter", input(0.79, 90.0));
        units.insert("lifeboat", input(0.79, 15.0));
        let allocated = allocate_effort(&units).unwrap();
        let keys: Vec<_> = allocated.keys().copied().collect();
        assert_eq!(keys, vec!["helicopter", "lifeboat"]);

        units.insert("drone", input(1.5, 40.0));
        assert!(allocate_effort(&units).is_err());
    }

    #[test]
    fn search_hours_invert_the_effective_area() {
        let result = compute_effort_allocation(&input(0.79, 10.0)).unwrap();
        let hours = required_search_hours(
            result.effective_area_nm2,
            result.track_spacing_nm,
            10.0,
        )
        .unwrap();
        assert!((hours - 2.0).abs() < 1e-12);
    }
}
