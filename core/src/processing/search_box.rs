//! Search-box construction around datum circles.
//!
//! The rapid-response box is laid out directly with rhumb-line steps. The
//! datum-point box is built in a local plane centred on the downwind datum:
//! a rectangle along the min/max axis is sized to the larger circle, closed
//! on the tangent of the smaller one, and then pushed outward wherever the
//! downwind circle still sticks out.

use crate::geo::plane::{segment_intersection, unit_vector, LocalFrame, PlanePoint, Segment};
use crate::geo::rhumb::{nm_to_meters, reverse_direction, turn_90_minus, turn_90_plus};
use crate::geo::{bearing, find_position};
use crate::prelude::{SarError, SarResult};
use crate::sar_interface::{DatumCircle, SearchBox};
use log::debug;

/// Tolerance, in nm, before a circle counts as sticking out of an edge.
const ENCLOSURE_TOLERANCE_NM: f64 = 1e-9;

/// Square of side 2r around the datum, two sides parallel to the residual drift.
pub fn rapid_response_box(circle: &DatumCircle) -> SearchBox {
    let radius_m = nm_to_meters(circle.radius_nm);
    let rdv = circle.rdv.direction_deg;
    let side = turn_90_plus(rdv);

    let top = find_position(circle.datum, rdv, radius_m);
    let bottom = find_position(circle.datum, reverse_direction(rdv), radius_m);

    SearchBox {
        a: find_position(top, reverse_direction(side), radius_m),
        b: find_position(top, side, radius_m),
        c: find_position(bottom, side, radius_m),
        d: find_position(bottom, reverse_direction(side), radius_m),
    }
}

/// Rectangle corners: `a`/`b` on the minus side, `c`/`d` on the plus side,
/// `a`/`d` at the back and `b`/`c` at the front.
#[derive(Debug, Clone, Copy)]
struct PlaneBox {
    a: PlanePoint,
    b: PlanePoint,
    c: PlanePoint,
    d: PlanePoint,
}

/// Moves the edge `p`-`q` along `normal` onto the line through `tangent`
/// running along `along`.
fn push_edge(
    p: PlanePoint,
    q: PlanePoint,
    normal: PlanePoint,
    along: PlanePoint,
    tangent: PlanePoint,
    reach: f64,
    label: &str,
) -> SarResult<(PlanePoint, PlanePoint)> {
    let tangent_line = Segment::new(tangent - along * reach, tangent + along * reach);
    let moved = |corner: PlanePoint| {
        segment_intersection(&Segment::ray(corner, normal, reach), &tangent_line).ok_or_else(|| {
            SarError::geometry(format!("datum point box: cannot push edge {}", label))
        })
    };
    Ok((moved(p)?, moved(q)?))
}

/// Number of rhumb-line samples taken around a circle boundary.
const BOUNDARY_SAMPLES: u32 = 360;

/// Circle boundary sampled along rhumb lines, expressed in `frame`.
pub(crate) fn boundary_points(frame: &LocalFrame, circle: &DatumCircle) -> Vec<PlanePoint> {
    let radius_m = nm_to_meters(circle.radius_nm);
    let step = 360.0 / f64::from(BOUNDARY_SAMPLES);
    (0..BOUNDARY_SAMPLES)
        .map(|i| frame.to_local(find_position(circle.datum, f64::from(i) * step, radius_m)))
        .collect()
}

/// Largest gap between the sampled chords and the true arc.
pub(crate) fn sampling_margin(radius_nm: f64) -> f64 {
    let half_step = (180.0 / f64::from(BOUNDARY_SAMPLES)).to_radians();
    radius_nm * (1.0 - half_step.cos())
}

/// Farthest reach of `points` past `edge_point` along `normal`.
pub(crate) fn support(points: &[PlanePoint], edge_point: PlanePoint, normal: PlanePoint) -> f64 {
    points
        .iter()
        .map(|p| (p - edge_point).dot(&normal))
        .fold(f64::NEG_INFINITY, f64::max)
}

fn enclose(
    rect: PlaneBox,
    boundary: &[PlanePoint],
    margin: f64,
    forward: PlanePoint,
    minus: PlanePoint,
    reach: f64,
) -> SarResult<PlaneBox> {
    let PlaneBox {
        mut a,
        mut b,
        mut c,
        mut d,
    } = rect;
    let plus = -minus;
    let backward = -forward;
    let excess = |edge_point: PlanePoint, normal: PlanePoint| {
        let overshoot = support(boundary, edge_point, normal) + margin;
        (overshoot > ENCLOSURE_TOLERANCE_NM).then(|| edge_point + normal * overshoot)
    };

    if let Some(tangent) = excess(a, minus) {
        (a, b) = push_edge(a, b, minus, forward, tangent, reach, "A-B")?;
    }
    if let Some(tangent) = excess(d, plus) {
        (d, c) = push_edge(d, c, plus, forward, tangent, reach, "C-D")?;
    }
    if let Some(tangent) = excess(a, backward) {
        (a, d) = push_edge(a, d, backward, minus, tangent, reach, "D-A")?;
    }
    if let Some(tangent) = excess(b, forward) {
        (b, c) = push_edge(b, c, forward, minus, tangent, reach, "B-C")?;
    }
    Ok(PlaneBox { a, b, c, d })
}

/// Rectangle enclosing the downwind, min and max datum circles.
pub fn datum_point_box(
    downwind: &DatumCircle,
    min: &DatumCircle,
    max: &DatumCircle,
) -> SarResult<SearchBox> {
    let frame = LocalFrame::new(downwind.datum);
    let (start, end) = if min.radius_nm > max.radius_nm {
        (min, max)
    } else {
        (max, min)
    };
    let axis_bearing = bearing(start.datum, end.datum);
    let forward = unit_vector(axis_bearing);
    let minus = unit_vector(turn_90_minus(axis_bearing));
    let plus = unit_vector(turn_90_plus(axis_bearing));

    let start_center = frame.to_local(start.datum);
    let end_center = frame.to_local(end.datum);
    let (rs, re) = (start.radius_nm, end.radius_nm);

    let spread = (end_center - start_center).norm() + start_center.norm();
    let reach = 10.0 * (rs + re + downwind.radius_nm + spread) + 1.0;

    let a = start_center + minus * rs - forward * rs;
    let d = start_center + plus * rs - forward * rs;
    let front = end_center + forward * re;

    let b = segment_intersection(
        &Segment::ray(front, minus, reach),
        &Segment::ray(a, forward, reach),
    )
    .ok_or_else(|| SarError::geometry("datum point box: front edge misses side A-B"))?;
    let c = segment_intersection(
        &Segment::ray(front, plus, reach),
        &Segment::ray(d, forward, reach),
    )
    .ok_or_else(|| SarError::geometry("datum point box: front edge misses side C-D"))?;

    // start and end are rechecked too: the plane rectangle only
    // approximates their rhumb-line boundaries
    let mut rect = PlaneBox { a, b, c, d };
    for circle in [downwind, start, end] {
        let boundary = boundary_points(&frame, circle);
        rect = enclose(
            rect,
            &boundary,
            sampling_margin(circle.radius_nm),
            forward,
            minus,
            reach,
        )?;
    }
    debug!(
        "datum point box along {:.1} deg, radii start {:.3} end {:.3} downwind {:.3}",
        axis_bearing, rs, re, downwind.radius_nm
    );

    Ok(SearchBox {
        a: frame.to_geo(rect.a),
        b: frame.to_geo(rect.b),
        c: frame.to_geo(rect.c),
        d: frame.to_geo(rect.d),
    })
}
