//! Merge of the three drift-start-point boxes into one datum-line area.
//!
//! All work happens in a plane centred on the middle box. Each side of the
//! area runs parallel to the line joining consecutive box centres, offset
//! far enough to clear every box corner and datum circle. At the middle
//! point the outer side of the bend gets a joint where the two side lines
//! meet; on the inner side the two lines are cut back to their crossing.

use crate::geo::plane::{
    bearing_of, line_intersection, segment_intersection, unit_vector, LocalFrame, PlanePoint,
    Segment,
};
use crate::geo::rhumb::{turn_90_minus, turn_90_plus};
use crate::geo::GeoPosition;
use crate::prelude::{SarError, SarResult};
use crate::processing::search_box::{boundary_points, sampling_margin, support};
use crate::sar_interface::DatumPointResult;
use log::debug;

/// Bend, in degrees, below which the three centres count as collinear.
const COLLINEAR_TURN_DEG: f64 = 1e-6;

/// A side line: base point plus unit direction.
#[derive(Debug, Clone, Copy)]
struct SideLine {
    base: PlanePoint,
    direction: PlanePoint,
}

impl SideLine {
    fn segment(&self, reach: f64) -> Segment {
        Segment::new(
            self.base - self.direction * reach,
            self.base + self.direction * reach,
        )
    }
}

/// Direction of one pair of consecutive centres and its two normals.
#[derive(Debug, Clone, Copy)]
struct Heading {
    bearing: f64,
    forward: PlanePoint,
    minus: PlanePoint,
    plus: PlanePoint,
}

impl Heading {
    fn between(from: PlanePoint, to: PlanePoint) -> Self {
        let bearing = bearing_of(to - from);
        Self {
            bearing,
            forward: unit_vector(bearing),
            minus: unit_vector(turn_90_minus(bearing)),
            plus: unit_vector(turn_90_plus(bearing)),
        }
    }
}

/// Signed change of heading in `(-180, 180]`; positive turns right.
fn turn_angle(from: f64, to: f64) -> f64 {
    let diff = (to - from).rem_euclid(360.0);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

fn cross(
    ray: Segment,
    line: &SideLine,
    reach: f64,
    dsp: usize,
    label: &str,
) -> SarResult<PlanePoint> {
    segment_intersection(&ray, &line.segment(reach))
        .ok_or_else(|| SarError::geometry(format!("datum line: {}", label)).for_dsp(dsp))
}

fn joint(first: &SideLine, second: &SideLine, label: &str) -> SarResult<PlanePoint> {
    line_intersection(first.base, first.direction, second.base, second.direction)
        .ok_or_else(|| SarError::geometry(format!("datum line: {} joint", label)).for_dsp(2))
}

/// Encloses the three datum-point results in one ring, ordered from the
/// DSP1 back corner along the minus side to DSP3 and back along the plus side.
pub fn merge_datum_line(points: &[DatumPointResult; 3]) -> SarResult<Vec<GeoPosition>> {
    let frame = LocalFrame::new(points[1].search_box.center());
    let centers = [0, 1, 2].map(|i| frame.to_local(points[i].search_box.center()));

    let mut samples = Vec::new();
    let mut margin: f64 = 0.0;
    for point in points {
        samples.extend(point.search_box.local_corners(&frame));
        for circle in point.circles() {
            samples.extend(boundary_points(&frame, &circle));
            margin = margin.max(sampling_margin(circle.radius_nm));
        }
    }
    let reach = 4.0
        * samples
            .iter()
            .map(|s| s.norm())
            .fold(0.0_f64, f64::max)
        + 1.0;

    let first = Heading::between(centers[0], centers[1]);
    let second = Heading::between(centers[1], centers[2]);

    // both side lines of a pair pass at the same offset from the centre line
    let minus_offset = support(&samples, centers[1], first.minus)
        .max(support(&samples, centers[1], second.minus))
        + margin;
    let plus_offset = support(&samples, centers[1], first.plus)
        .max(support(&samples, centers[1], second.plus))
        + margin;

    let side = |heading: &Heading, normal: PlanePoint, offset: f64| SideLine {
        base: centers[1] + normal * offset,
        direction: heading.forward,
    };
    let m12 = side(&first, first.minus, minus_offset);
    let m23 = side(&second, second.minus, minus_offset);
    let p12 = side(&first, first.plus, plus_offset);
    let p23 = side(&second, second.plus, plus_offset);

    let back_offset = -support(&samples, centers[0], -first.forward) - margin;
    let back = SideLine {
        base: centers[0] + first.forward * back_offset,
        direction: first.minus,
    };
    let front_offset = support(&samples, centers[2], second.forward) + margin;
    let front = SideLine {
        base: centers[2] + second.forward * front_offset,
        direction: second.minus,
    };

    let tangent = |dsp: usize, normal: PlanePoint, line: &SideLine, label: &str| {
        cross(
            Segment::ray(centers[dsp - 1], normal, reach),
            line,
            reach,
            dsp,
            label,
        )
    };
    let t1m = tangent(1, first.minus, &m12, "minus tangent")?;
    let t2m12 = tangent(2, first.minus, &m12, "minus tangent toward DSP1")?;
    let t2m23 = tangent(2, second.minus, &m23, "minus tangent toward DSP3")?;
    let t3m = tangent(3, second.minus, &m23, "minus tangent")?;
    let t1p = tangent(1, first.plus, &p12, "plus tangent")?;
    let t2p12 = tangent(2, first.plus, &p12, "plus tangent toward DSP1")?;
    let t2p23 = tangent(2, second.plus, &p23, "plus tangent toward DSP3")?;
    let t3p = tangent(3, second.plus, &p23, "plus tangent")?;

    let corner = |dsp: usize, cap: &SideLine, line: &SideLine, label: &str| {
        cross(cap.segment(reach), line, reach, dsp, label)
    };
    let final_a = corner(1, &back, &m12, "back edge misses minus side")?;
    let final_d = corner(1, &back, &p12, "back edge misses plus side")?;
    let final_b = corner(3, &front, &m23, "front edge misses minus side")?;
    let final_c = corner(3, &front, &p23, "front edge misses plus side")?;

    let turn = turn_angle(first.bearing, second.bearing);
    let (minus_bend, plus_bend) = if turn > COLLINEAR_TURN_DEG {
        // right turn: minus side is the outside of the bend
        (
            vec![t2m12, joint(&m12, &m23, "minus")?, t2m23],
            vec![joint(&p23, &p12, "plus")?],
        )
    } else if turn < -COLLINEAR_TURN_DEG {
        (
            vec![joint(&m12, &m23, "minus")?],
            vec![t2p23, joint(&p23, &p12, "plus")?, t2p12],
        )
    } else {
        (vec![t2m12, t2m23], vec![t2p23, t2p12])
    };
    debug!(
        "datum line turn {:.2} deg, side offsets minus {:.3} plus {:.3} nm",
        turn, minus_offset, plus_offset
    );

    let ring: Vec<PlanePoint> = [final_a, t1m]
        .into_iter()
        .chain(minus_bend)
        .chain([t3m, final_b, final_c, t3p])
        .chain(plus_bend)
        .chain([t1p, final_d])
        .collect();
    Ok(ring.into_iter().map(|p| frame.to_geo(p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::rhumb::nm_to_meters;
    use crate::geo::{find_position, range_nm};
    use crate::processing::search_box::datum_point_box;
    use crate::sar_interface::{DatumCircle, DatumLineResult, DriftResult, ResidualDrift};

    fn circle(datum: GeoPosition, radius_nm: f64) -> DatumCircle {
        DatumCircle {
            datum,
            radius_nm,
            rdv: ResidualDrift {
                direction_deg: 180.0,
                distance_nm: 1.0,
                speed_kn: 0.5,
            },
        }
    }

    fn datum_point(center: GeoPosition, radius_nm: f64) -> DatumPointResult {
        let downwind = circle(center, radius_nm);
        let min = circle(find_position(center, 150.0, nm_to_meters(0.6)), radius_nm * 1.05);
        let max = circle(find_position(center, 210.0, nm_to_meters(0.6)), radius_nm * 0.95);
        DatumPointResult {
            lkp: center,
            elapsed_hours: 2.0,
            drift: DriftResult::default(),
            downwind,
            min,
            max,
            search_box: datum_point_box(&downwind, &min, &max).unwrap(),
        }
    }

    fn line_result(centers: [GeoPosition; 3]) -> DatumLineResult {
        let points = [
            datum_point(centers[0], 1.2),
            datum_point(centers[1], 1.5),
            datum_point(centers[2], 1.1),
        ];
        let polygon = merge_datum_line(&points).unwrap();
        DatumLineResult { points, polygon }
    }

    fn assert_encloses_everything(result: &DatumLineResult) {
        for point in &result.points {
            for corner in point.search_box.corners() {
                assert!(result.contains(corner) || near_ring(result, corner));
            }
            for c in point.circles() {
                for deg in (0..360).step_by(5) {
                    let edge = find_position(c.datum, deg as f64, nm_to_meters(c.radius_nm * 0.999));
                    assert!(result.contains(edge), "circle point {} outside", edge);
                }
            }
        }
    }

    // corners of the individual boxes may sit exactly on the merged boundary
    fn near_ring(result: &DatumLineResult, position: GeoPosition) -> bool {
        let nudged = [0.0, 90.0, 180.0, 270.0]
            .iter()
            .map(|b| find_position(position, *b, 2.0))
            .filter(|p| result.contains(*p))
            .count();
        nudged > 0
    }

    #[test]
    fn turn_angle_is_signed() {
        assert_eq!(turn_angle(10.0, 40.0), 30.0);
        assert_eq!(turn_angle(350.0, 20.0), 30.0);
        assert_eq!(turn_angle(40.0, 10.0), -30.0);
    }

    #[test]
    fn collinear_line_keeps_both_middle_tangents() {
        let c1 = GeoPosition::new(56.0, 12.0);
        let c2 = find_position(c1, 90.0, nm_to_meters(5.0));
        let c3 = find_position(c2, 90.0, nm_to_meters(5.0));
        let result = line_result([c1, c2, c3]);
        assert_eq!(result.polygon.len(), 12);
        assert_encloses_everything(&result);
    }

    #[test]
    fn right_turn_adds_an_outer_joint() {
        let c1 = GeoPosition::new(56.0, 12.0);
        let c2 = find_position(c1, 90.0, nm_to_meters(6.0));
        let c3 = find_position(c2, 135.0, nm_to_meters(6.0));
        let result = line_result([c1, c2, c3]);
        assert_eq!(result.polygon.len(), 12);
        let middle = result.points[1].search_box.center();
        // outer joint sits beyond the tangent points on the minus side
        assert!(range_nm(middle, result.polygon[3]) > range_nm(middle, result.polygon[2]));
        assert!(range_nm(middle, result.polygon[3]) > range_nm(middle, result.polygon[4]));
        assert_encloses_everything(&result);
    }

    #[test]
    fn left_turn_mirrors_the_joint() {
        let c1 = GeoPosition::new(56.0, 12.0);
        let c2 = find_position(c1, 90.0, nm_to_meters(6.0));
        let c3 = find_position(c2, 45.0, nm_to_meters(6.0));
        let result = line_result([c1, c2, c3]);
        assert_eq!(result.polygon.len(), 12);
        let middle = result.points[1].search_box.center();
        // plus side: T3p, T2p23, joint, T2p12, T1p
        assert!(range_nm(middle, result.polygon[8]) > range_nm(middle, result.polygon[7]));
        assert!(range_nm(middle, result.polygon[8]) > range_nm(middle, result.polygon[9]));
        assert_encloses_everything(&result);
    }

    #[test]
    fn doubling_back_onto_dsp1_has_no_joint() {
        let c1 = GeoPosition::new(56.0, 12.0);
        let c2 = find_position(c1, 90.0, nm_to_meters(5.0));
        let first = datum_point(c1, 1.2);
        let points = [first.clone(), datum_point(c2, 1.5), first];
        let err = merge_datum_line(&points).unwrap_err();
        match err {
            SarError::GeometryDegenerate { context, dsp } => {
                assert_eq!(dsp, Some(2));
                assert!(context.contains("joint"), "{}", context);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn ring_starts_at_the_dsp1_minus_corner() {
        let c1 = GeoPosition::new(56.0, 12.0);
        let c2 = find_position(c1, 0.0, nm_to_meters(5.0));
        let c3 = find_position(c2, 0.0, nm_to_meters(5.0));
        let result = line_result([c1, c2, c3]);
        // heading north, the minus side is west and the back edge is south
        let a = result.polygon[0];
        assert!(a.longitude < c1.longitude);
        assert!(a.latitude < c1.latitude);
    }
}
