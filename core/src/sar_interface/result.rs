use crate::geo::plane::{polygon_area, polygon_contains, LocalFrame, PlanePoint};
use crate::geo::GeoPosition;
use crate::prelude::{SarError, SarResult};
use crate::sar_interface::input::OperationType;
use serde::{Deserialize, Serialize};

/// Positions produced by the drift integrator, one entry per weather sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftResult {
    pub current_positions: Vec<GeoPosition>,
    pub downwind_positions: Vec<GeoPosition>,
    /// Only populated for divergence-aware operations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub min_positions: Vec<GeoPosition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub max_positions: Vec<GeoPosition>,
    pub valid_hours: Vec<f64>,
}

impl DriftResult {
    pub fn leg_count(&self) -> usize {
        self.downwind_positions.len()
    }
}

/// Residual drift vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualDrift {
    pub direction_deg: f64,
    pub distance_nm: f64,
    pub speed_kn: f64,
}

/// A datum with its uncertainty radius and the drift that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatumCircle {
    pub datum: GeoPosition,
    pub radius_nm: f64,
    pub rdv: ResidualDrift,
}

/// Four-corner search area; the ring runs A-B-C-D and closes back to A.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBox {
    pub a: GeoPosition,
    pub b: GeoPosition,
    pub c: GeoPosition,
    pub d: GeoPosition,
}

impl SearchBox {
    pub fn corners(&self) -> [GeoPosition; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Plane area around the box centre; the rhumb side lengths shrink
    /// poleward and would understate it.
    pub fn area_nm2(&self) -> f64 {
        let frame = LocalFrame::new(self.center());
        polygon_area(&self.local_corners(&frame))
    }

    pub fn center(&self) -> GeoPosition {
        let frame = LocalFrame::new(self.a);
        let sum = self
            .corners()
            .iter()
            .fold(PlanePoint::zeros(), |acc, corner| acc + frame.to_local(*corner));
        frame.to_geo(sum / 4.0)
    }

    pub fn local_corners(&self, frame: &LocalFrame) -> [PlanePoint; 4] {
        self.corners().map(|corner| frame.to_local(corner))
    }

    pub fn contains(&self, position: GeoPosition) -> bool {
        let frame = LocalFrame::new(self.center());
        polygon_contains(&self.local_corners(&frame), frame.to_local(position))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RapidResponseResult {
    pub elapsed_hours: f64,
    pub drift: DriftResult,
    pub circle: DatumCircle,
    pub search_box: SearchBox,
}

impl RapidResponseResult {
    /// Size of the square circumscribing the datum circle.
    pub fn area_nm2(&self) -> f64 {
        let side = 2.0 * self.circle.radius_nm;
        side * side
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatumPointResult {
    pub lkp: GeoPosition,
    pub elapsed_hours: f64,
    pub drift: DriftResult,
    pub downwind: DatumCircle,
    pub min: DatumCircle,
    pub max: DatumCircle,
    pub search_box: SearchBox,
}

impl DatumPointResult {
    pub fn circles(&self) -> [DatumCircle; 3] {
        [self.downwind, self.min, self.max]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatumLineResult {
    pub points: [DatumPointResult; 3],
    /// Enclosing ring over all three drift start points, implicitly closed.
    pub polygon: Vec<GeoPosition>,
}

impl DatumLineResult {
    fn local_ring(&self) -> (LocalFrame, Vec<PlanePoint>) {
        let frame = LocalFrame::new(self.points[1].search_box.center());
        let ring = self.polygon.iter().map(|p| frame.to_local(*p)).collect();
        (frame, ring)
    }

    pub fn contains(&self, position: GeoPosition) -> bool {
        let (frame, ring) = self.local_ring();
        polygon_contains(&ring, frame.to_local(position))
    }

    pub fn area_nm2(&self) -> f64 {
        polygon_area(&self.local_ring().1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleSarResult {
    pub datum: GeoPosition,
    pub search_box: SearchBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SarOutcome {
    RapidResponse(RapidResponseResult),
    DatumPoint(DatumPointResult),
    DatumLine(DatumLineResult),
    SimpleSar(SimpleSarResult),
}

impl SarOutcome {
    pub fn operation_type(&self) -> OperationType {
        match self {
            SarOutcome::RapidResponse(_) => OperationType::RapidResponse,
            SarOutcome::DatumPoint(_) => OperationType::DatumPoint,
            SarOutcome::DatumLine(_) => OperationType::DatumLine,
            SarOutcome::SimpleSar(_) => OperationType::SimpleSar,
        }
    }

    /// Best single datum estimate; the middle drift start point for a datum line.
    pub fn datum(&self) -> GeoPosition {
        match self {
            SarOutcome::RapidResponse(result) => result.circle.datum,
            SarOutcome::DatumPoint(result) => result.downwind.datum,
            SarOutcome::DatumLine(result) => result.points[1].downwind.datum,
            SarOutcome::SimpleSar(result) => result.datum,
        }
    }

    pub fn search_polygon(&self) -> Vec<GeoPosition> {
        match self {
            SarOutcome::RapidResponse(result) => result.search_box.corners().to_vec(),
            SarOutcome::DatumPoint(result) => result.search_box.corners().to_vec(),
            SarOutcome::DatumLine(result) => result.polygon.clone(),
            SarOutcome::SimpleSar(result) => result.search_box.corners().to_vec(),
        }
    }

    /// Area the search units have to cover, in square nautical miles.
    pub fn search_area_nm2(&self) -> f64 {
        match self {
            SarOutcome::RapidResponse(result) => result.area_nm2(),
            SarOutcome::DatumPoint(result) => result.search_box.area_nm2(),
            SarOutcome::DatumLine(result) => result.area_nm2(),
            SarOutcome::SimpleSar(result) => result.search_box.area_nm2(),
        }
    }

    pub fn circles(&self) -> Vec<DatumCircle> {
        match self {
            SarOutcome::RapidResponse(result) => vec![result.circle],
            SarOutcome::DatumPoint(result) => result.circles().to_vec(),
            SarOutcome::DatumLine(result) => {
                result.points.iter().flat_map(|p| p.circles()).collect()
            }
            SarOutcome::SimpleSar(_) => Vec::new(),
        }
    }

    pub fn to_json(&self) -> SarResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|err| SarError::Internal(err.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffortAllocationResult {
    pub track_spacing_nm: f64,
    pub effective_area_nm2: f64,
    /// Coverage factor C = W / S.
    pub coverage_factor: f64,
    pub track_length_nm: f64,
}

impl EffortAllocationResult {
    /// Side of the square with the effective search area.
    pub fn area_side_nm(&self) -> f64 {
        self.effective_area_nm2.sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedDatum {
    pub offset_minutes: i64,
    pub outcome: SarOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::rhumb::nm_to_meters;
    use crate::geo::{find_position, range_nm};

    fn square_box(center: GeoPosition, half_side_nm: f64) -> SearchBox {
        let north = find_position(center, 0.0, nm_to_meters(half_side_nm));
        let south = find_position(center, 180.0, nm_to_meters(half_side_nm));
        let d = nm_to_meters(half_side_nm);
        SearchBox {
            a: find_position(north, 270.0, d),
            b: find_position(north, 90.0, d),
            c: find_position(south, 90.0, d),
            d: find_position(south, 270.0, d),
        }
    }

    #[test]
    fn search_box_area_and_center() {
        let center = GeoPosition::new(56.0, 12.0);
        let search_box = square_box(center, 1.0);
        assert!((search_box.area_nm2() - 4.0).abs() < 1e-3);
        let c = search_box.center();
        assert!(range_nm(c, center) < 1e-3);
        assert!(search_box.contains(center));
        assert!(!search_box.contains(find_position(center, 45.0, nm_to_meters(2.0))));
    }

    #[test]
    fn plane_built_box_keeps_its_area_at_high_latitude() {
        let center = GeoPosition::new(70.0, 12.0);
        let frame = LocalFrame::new(center);
        let corner = |x: f64, y: f64| frame.to_geo(PlanePoint::new(x, y));
        let search_box = SearchBox {
            a: corner(-5.0, 5.0),
            b: corner(5.0, 5.0),
            c: corner(5.0, -5.0),
            d: corner(-5.0, -5.0),
        };
        // the northern edge is shorter along its rhumb line than the southern one
        assert!(range_nm(search_box.a, search_box.b) < range_nm(search_box.d, search_box.c));
        assert!((search_box.area_nm2() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn outcome_serializes_with_type_tag() {
        let center = GeoPosition::new(56.0, 12.0);
        let outcome = SarOutcome::SimpleSar(SimpleSarResult {
            datum: center,
            search_box: square_box(center, 1.0),
        });
        let json = outcome.to_json().unwrap();
        assert_eq!(json["type"], "simple_sar");
        assert_eq!(outcome.search_polygon().len(), 4);
        assert_eq!(outcome.operation_type(), OperationType::SimpleSar);
        assert_eq!(outcome.datum(), center);
    }
}
