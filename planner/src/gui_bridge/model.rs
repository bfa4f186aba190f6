use crate::workflow::runner::{EffortRow, WorkflowResult};
use sarcore::sar_interface::{DatumCircle, OperationType};
use sarcore::GeoPosition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Datum position at one projection offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub offset_minutes: i64,
    pub datum: GeoPosition,
}

/// What the map layer draws: datum, circles, search polygon and projections.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SarViewModel {
    pub operation: Option<OperationType>,
    pub datum: Option<GeoPosition>,
    pub circles: Vec<DatumCircle>,
    pub search_polygon: Vec<GeoPosition>,
    pub search_area_nm2: f64,
    pub effort: BTreeMap<String, EffortRow>,
    pub projections: Vec<ProjectedPoint>,
    pub notes: Vec<String>,
}

impl SarViewModel {
    pub fn from_result(result: &WorkflowResult) -> Self {
        Self {
            operation: Some(result.outcome.operation_type()),
            datum: Some(result.outcome.datum()),
            circles: result.outcome.circles(),
            search_polygon: result.outcome.search_polygon(),
            search_area_nm2: result.search_area_nm2,
            effort: result.effort.clone(),
            projections: result
                .projections
                .iter()
                .map(|p| ProjectedPoint {
                    offset_minutes: p.offset_minutes,
                    datum: p.outcome.datum(),
                })
                .collect(),
            notes: Vec::new(),
        }
    }
}
