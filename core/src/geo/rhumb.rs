//! Rhumb-line (constant true bearing) navigation on a spherical earth.
//!
//! Every drift leg and every search-box side is laid out along a rhumb line,
//! so the forward and inverse solutions below share the same Mercator
//! stretch and stay consistent inverses of each other.

use crate::geo::position::GeoPosition;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

pub const METERS_PER_NM: f64 = 1852.0;

/// Below this latitude change the Mercator ratio is taken at the mid latitude;
/// the log difference loses precision there.
const SMALL_LATITUDE_DELTA: f64 = 1e-6;

pub fn nm_to_meters(nm: f64) -> f64 {
    nm * METERS_PER_NM
}

pub fn meters_to_nm(meters: f64) -> f64 {
    meters / METERS_PER_NM
}

/// Normalizes any angle in degrees into `[0, 360)`.
pub fn normalize_bearing(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn reverse_direction(bearing_deg: f64) -> f64 {
    normalize_bearing(bearing_deg + 180.0)
}

pub fn turn_90_plus(bearing_deg: f64) -> f64 {
    normalize_bearing(bearing_deg + 90.0)
}

pub fn turn_90_minus(bearing_deg: f64) -> f64 {
    normalize_bearing(bearing_deg - 90.0)
}

fn normalize_longitude(lambda: f64) -> f64 {
    let wrapped = (lambda + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped < -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

fn mercator_ratio(phi1: f64, phi2: f64) -> f64 {
    let d_phi = phi2 - phi1;
    if d_phi.abs() < SMALL_LATITUDE_DELTA {
        return ((phi1 + phi2) / 2.0).cos();
    }
    let d_psi = ((phi2 / 2.0 + FRAC_PI_4).tan() / (phi1 / 2.0 + FRAC_PI_4).tan()).ln();
    d_phi / d_psi
}

/// Position reached from `start` after `distance_m` along `bearing_deg`.
pub fn find_position(start: GeoPosition, bearing_deg: f64, distance_m: f64) -> GeoPosition {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let phi1 = start.latitude.to_radians();
    let lambda1 = start.longitude.to_radians();

    let d_phi = delta * theta.cos();
    let mut phi2 = phi1 + d_phi;
    if phi2.abs() > FRAC_PI_2 {
        phi2 = if phi2 > 0.0 { PI - phi2 } else { -PI - phi2 };
    }

    let q = mercator_ratio(phi1, phi2);
    let d_lambda = if q.abs() > f64::EPSILON {
        delta * theta.sin() / q
    } else {
        0.0
    };
    let lambda2 = normalize_longitude(lambda1 + d_lambda);

    GeoPosition::new(phi2.to_degrees(), lambda2.to_degrees())
}

fn deltas(a: GeoPosition, b: GeoPosition) -> (f64, f64, f64) {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let mut d_lambda = (b.longitude - a.longitude).to_radians();
    if d_lambda.abs() > PI {
        d_lambda = if d_lambda > 0.0 {
            -(2.0 * PI - d_lambda)
        } else {
            2.0 * PI + d_lambda
        };
    }
    (phi2 - phi1, d_lambda, mercator_ratio(phi1, phi2))
}

/// Rhumb-line bearing from `a` to `b` in `[0, 360)`; 0 for identical points.
pub fn bearing(a: GeoPosition, b: GeoPosition) -> f64 {
    let (d_phi, d_lambda, q) = deltas(a, b);
    if d_phi == 0.0 && d_lambda == 0.0 {
        return 0.0;
    }
    // atan2 of the Mercator-projected deltas: d_lambda against d_phi / q.
    let theta = (d_lambda * q).atan2(d_phi);
    normalize_bearing(theta.to_degrees())
}

/// Rhumb-line distance from `a` to `b` in nautical miles.
pub fn range_nm(a: GeoPosition, b: GeoPosition) -> f64 {
    let (d_phi, d_lambda, q) = deltas(a, b);
    let delta = (d_phi * d_phi + q * q * d_lambda * d_lambda).sqrt();
    meters_to_nm(delta * EARTH_RADIUS_M)
}
