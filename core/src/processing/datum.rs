use crate::geo::{bearing, range_nm, GeoPosition};
use crate::prelude::{SarError, SarResult};
use crate::sar_interface::{DatumCircle, DriftResult, ResidualDrift, SarHeader};

/// Share of the residual drift distance added to the probable error.
pub const DRIFT_ERROR_RATIO: f64 = 0.3;

/// Total probable error E = X + Y + 0.3 * De, scaled by the safety factor.
pub fn uncertainty_radius(header: &SarHeader, drift_distance_nm: f64) -> f64 {
    let probable_error =
        header.position_error_x_nm + header.nav_error_y_nm + DRIFT_ERROR_RATIO * drift_distance_nm;
    probable_error * header.safety_factor
}

pub fn residual_drift(from: GeoPosition, to: GeoPosition, hours: f64) -> SarResult<ResidualDrift> {
    if !(hours.is_finite() && hours > 0.0) {
        return Err(SarError::ArithmeticDegenerate(format!(
            "residual drift over {} h has no defined speed",
            hours
        )));
    }
    let distance_nm = range_nm(from, to);
    Ok(ResidualDrift {
        direction_deg: bearing(from, to),
        distance_nm,
        speed_kn: distance_nm / hours,
    })
}

fn circle(header: &SarHeader, datum: GeoPosition, rdv: ResidualDrift) -> DatumCircle {
    DatumCircle {
        datum,
        radius_nm: uncertainty_radius(header, rdv.distance_nm),
        rdv,
    }
}

fn check_elapsed(header: &SarHeader) -> SarResult<f64> {
    let elapsed = header.elapsed_hours();
    if elapsed <= 0.0 {
        return Err(SarError::ArithmeticDegenerate(format!(
            "elapsed time {} h between LKP and CSS",
            elapsed
        )));
    }
    Ok(elapsed)
}

/// Rapid-response datum: the last downwind position with its residual drift.
///
/// The residual vector covers the last leg that actually drifted; legs
/// without duration leave the position where it was. When only the first
/// leg (or none) carries time it is measured from the LKP over the whole
/// elapsed time.
pub fn rapid_response_circle(header: &SarHeader, drift: &DriftResult) -> SarResult<DatumCircle> {
    let elapsed = check_elapsed(header)?;
    let datum = *drift
        .downwind_positions
        .last()
        .ok_or_else(|| SarError::invalid("drift produced no positions"))?;

    let last_active = drift
        .valid_hours
        .iter()
        .take(drift.downwind_positions.len())
        .rposition(|hours| *hours > 0.0);
    let rdv = match last_active {
        Some(index) if index > 0 => residual_drift(
            drift.downwind_positions[index - 1],
            drift.downwind_positions[index],
            drift.valid_hours[index],
        )?,
        _ => residual_drift(header.lkp, datum, elapsed)?,
    };
    Ok(circle(header, datum, rdv))
}

/// The downwind, min and max datum circles of a datum-point operation, each
/// measured from the LKP over the elapsed time.
pub fn datum_point_circles(
    header: &SarHeader,
    drift: &DriftResult,
) -> SarResult<[DatumCircle; 3]> {
    let elapsed = check_elapsed(header)?;
    let last = |positions: &[GeoPosition], label: &str| {
        positions
            .last()
            .copied()
            .ok_or_else(|| SarError::invalid(format!("drift produced no {} positions", label)))
    };
    let downwind = last(&drift.downwind_positions, "downwind")?;
    let min = last(&drift.min_positions, "min")?;
    let max = last(&drift.max_positions, "max")?;

    let mut circles = Vec::with_capacity(3);
    for datum in [downwind, min, max] {
        let rdv = residual_drift(header.lkp, datum, elapsed)?;
        circles.push(circle(header, datum, rdv));
    }
    Ok([circles[0], circles[1], circles[2]])
}
