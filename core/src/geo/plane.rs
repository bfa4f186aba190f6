//! Local tangent-plane geometry for search-area construction.
//!
//! Search boxes span a few tens of nautical miles at most, so box edges and
//! tangent lines are intersected in an equirectangular plane centred on a
//! reference position, with coordinates in nautical miles (x east, y north).

use crate::geo::position::GeoPosition;
use crate::geo::rhumb::{normalize_bearing, EARTH_RADIUS_M, METERS_PER_NM};
use nalgebra::Vector2;

pub type PlanePoint = Vector2<f64>;

/// Determinant threshold below which two directions count as parallel.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Slack on the segment parameters so a hit exactly on an end point counts.
const SEGMENT_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin: GeoPosition,
    nm_per_radian: f64,
    cos_origin: f64,
}

impl LocalFrame {
    pub fn new(origin: GeoPosition) -> Self {
        Self {
            origin,
            nm_per_radian: EARTH_RADIUS_M / METERS_PER_NM,
            cos_origin: origin.latitude.to_radians().cos(),
        }
    }

    pub fn origin(&self) -> GeoPosition {
        self.origin
    }

    pub fn to_local(&self, position: GeoPosition) -> PlanePoint {
        let mut d_lon = position.longitude - self.origin.longitude;
        if d_lon > 180.0 {
            d_lon -= 360.0;
        } else if d_lon < -180.0 {
            d_lon += 360.0;
        }
        let d_lat = position.latitude - self.origin.latitude;
        PlanePoint::new(
            d_lon.to_radians() * self.cos_origin * self.nm_per_radian,
            d_lat.to_radians() * self.nm_per_radian,
        )
    }

    pub fn to_geo(&self, point: PlanePoint) -> GeoPosition {
        let latitude = self.origin.latitude + (point.y / self.nm_per_radian).to_degrees();
        let mut longitude =
            self.origin.longitude + (point.x / (self.cos_origin * self.nm_per_radian)).to_degrees();
        if longitude > 180.0 {
            longitude -= 360.0;
        } else if longitude < -180.0 {
            longitude += 360.0;
        }
        GeoPosition::new(latitude, longitude)
    }
}

/// Unit vector pointing along a true bearing.
pub fn unit_vector(bearing_deg: f64) -> PlanePoint {
    let theta = bearing_deg.to_radians();
    PlanePoint::new(theta.sin(), theta.cos())
}

pub fn bearing_of(vector: PlanePoint) -> f64 {
    if vector.x == 0.0 && vector.y == 0.0 {
        return 0.0;
    }
    normalize_bearing(vector.x.atan2(vector.y).to_degrees())
}

fn cross(a: PlanePoint, b: PlanePoint) -> f64 {
    a.x * b.y - a.y * b.x
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: PlanePoint,
    pub end: PlanePoint,
}

impl Segment {
    pub fn new(start: PlanePoint, end: PlanePoint) -> Self {
        Self { start, end }
    }

    /// Segment of `length` nm leaving `start` along `direction`.
    pub fn ray(start: PlanePoint, direction: PlanePoint, length: f64) -> Self {
        Self {
            start,
            end: start + direction * length,
        }
    }
}

/// Crossing point of two finite segments, `None` when they are parallel or miss.
pub fn segment_intersection(a: &Segment, b: &Segment) -> Option<PlanePoint> {
    let r = a.end - a.start;
    let s = b.end - b.start;
    let denom = cross(r, s);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let offset = b.start - a.start;
    let t = cross(offset, s) / denom;
    let u = cross(offset, r) / denom;
    let range = -SEGMENT_SLACK..=1.0 + SEGMENT_SLACK;
    if range.contains(&t) && range.contains(&u) {
        Some(a.start + r * t)
    } else {
        None
    }
}

pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    segment_intersection(a, b).is_some()
}

/// Crossing point of two infinite lines given as point and direction.
pub fn line_intersection(
    p: PlanePoint,
    r: PlanePoint,
    q: PlanePoint,
    s: PlanePoint,
) -> Option<PlanePoint> {
    let denom = cross(r, s);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = cross(q - p, s) / denom;
    Some(p + r * t)
}

/// Even-odd containment test; the ring is implicitly closed.
pub fn polygon_contains(polygon: &[PlanePoint], point: PlanePoint) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shoelace area of an implicitly closed ring, in square nautical miles.
pub fn polygon_area(polygon: &[PlanePoint]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let twice_area: f64 = polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(p, q)| cross(*p, *q))
        .sum();
    twice_area.abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments_meet_in_the_middle() {
        let a = Segment::new(PlanePoint::new(-1.0, 0.0), PlanePoint::new(1.0, 0.0));
        let b = Segment::new(PlanePoint::new(0.0, -1.0), PlanePoint::new(0.0, 1.0));
        let hit = segment_intersection(&a, &b).unwrap();
        assert!(hit.norm() < 1e-12);
    }

    #[test]
    fn parallel_and_short_segments_do_not_intersect() {
        let a = Segment::new(PlanePoint::new(0.0, 0.0), PlanePoint::new(1.0, 0.0));
        let parallel = Segment::new(PlanePoint::new(0.0, 1.0), PlanePoint::new(1.0, 1.0));
        let short = Segment::new(PlanePoint::new(2.0, -1.0), PlanePoint::new(2.0, 1.0));
        assert!(segment_intersection(&a, &parallel).is_none());
        assert!(!segments_intersect(&a, &short));
    }

    #[test]
    fn frame_round_trips_positions() {
        let frame = LocalFrame::new(GeoPosition::new(56.0, 12.0));
        let p = GeoPosition::new(56.1, 11.8);
        let back = frame.to_geo(frame.to_local(p));
        assert!((back.latitude - p.latitude).abs() < 1e-12);
        assert!((back.longitude - p.longitude).abs() < 1e-12);
    }

    #[test]
    fn unit_vectors_follow_compass_convention() {
        let east = unit_vector(90.0);
        assert!((east.x - 1.0).abs() < 1e-12 && east.y.abs() < 1e-12);
        assert!((bearing_of(PlanePoint::new(0.0, -2.0)) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn polygon_contains_square_interior_only() {
        let square = [
            PlanePoint::new(0.0, 0.0),
            PlanePoint::new(2.0, 0.0),
            PlanePoint::new(2.0, 2.0),
            PlanePoint::new(0.0, 2.0),
        ];
        assert!(polygon_contains(&square, PlanePoint::new(1.0, 1.0)));
        assert!(!polygon_contains(&square, PlanePoint::new(3.0, 1.0)));
        assert!((polygon_area(&square) - 4.0).abs() < 1e-12);
    }
}
