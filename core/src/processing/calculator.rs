use crate::geo::rhumb::nm_to_meters;
use crate::geo::{find_position, GeoPosition};
use crate::prelude::{SarError, SarResult};
use crate::processing::datum::{datum_point_circles, rapid_response_circle};
use crate::processing::datum_line::merge_datum_line;
use crate::processing::drift::{integrate, DriftTracks};
use crate::processing::effort;
use crate::processing::projection::FutureProjection;
use crate::processing::search_box::{datum_point_box, rapid_response_box};
use crate::sar_interface::{
    DatumLineResult, DatumPointResult, EffortAllocationInput, EffortAllocationResult,
    OperationType, ProjectedDatum, RapidResponseResult, SarHeader, SarInput, SarOperation,
    SarOutcome, SimpleSarResult,
};
use crate::telemetry::{LogManager, MetricsRecorder};

fn expect_operation(input: &SarInput, expected: OperationType) -> SarResult<()> {
    if input.operation_type() != expected {
        return Err(SarError::invalid(format!(
            "expected a {:?} operation, got {:?}",
            expected,
            input.operation_type()
        )));
    }
    input.validate()
}

fn rapid_response_from(header: &SarHeader) -> SarResult<RapidResponseResult> {
    let drift = integrate(header, DriftTracks::Downwind)?;
    let circle = rapid_response_circle(header, &drift)?;
    Ok(RapidResponseResult {
        elapsed_hours: header.elapsed_hours(),
        search_box: rapid_response_box(&circle),
        drift,
        circle,
    })
}

fn datum_point_from(header: &SarHeader) -> SarResult<DatumPointResult> {
    let drift = integrate(header, DriftTracks::Divergent)?;
    let [downwind, min, max] = datum_point_circles(header, &drift)?;
    Ok(DatumPointResult {
        lkp: header.lkp,
        elapsed_hours: header.elapsed_hours(),
        search_box: datum_point_box(&downwind, &min, &max)?,
        drift,
        downwind,
        min,
        max,
    })
}

pub fn rapid_response(input: &SarInput) -> SarResult<RapidResponseResult> {
    expect_operation(input, OperationType::RapidResponse)?;
    rapid_response_from(&input.header)
}

pub fn datum_point(input: &SarInput) -> SarResult<DatumPointResult> {
    expect_operation(input, OperationType::DatumPoint)?;
    datum_point_from(&input.header)
}

/// Runs a datum point from each of the three drift start points and merges
/// the boxes. Failures carry the 1-based index of the offending point.
pub fn datum_line(input: &SarInput) -> SarResult<DatumLineResult> {
    expect_operation(input, OperationType::DatumLine)?;
    let results = input
        .drift_start_points()
        .iter()
        .enumerate()
        .map(|(index, dsp)| {
            datum_point_from(&input.header_for(dsp)).map_err(|err| err.for_dsp(index + 1))
        })
        .collect::<SarResult<Vec<_>>>()?;
    let points: [DatumPointResult; 3] = results
        .try_into()
        .map_err(|_| SarError::Internal("datum line needs exactly three drift start points".into()))?;
    let polygon = merge_datum_line(&points)?;
    Ok(DatumLineResult { points, polygon })
}

/// Echoes the operator's datum and box; no drift is applied.
pub fn simple_sar(input: &SarInput) -> SarResult<SimpleSarResult> {
    expect_operation(input, OperationType::SimpleSar)?;
    match &input.operation {
        SarOperation::SimpleSar { datum, search_box } => Ok(SimpleSarResult {
            datum: *datum,
            search_box: *search_box,
        }),
        _ => Err(SarError::Internal("operation type mismatch".into())),
    }
}

/// Validates the input and dispatches on its operation type.
pub fn compute(input: &SarInput) -> SarResult<SarOutcome> {
    Ok(match input.operation_type() {
        OperationType::RapidResponse => SarOutcome::RapidResponse(rapid_response(input)?),
        OperationType::DatumPoint => SarOutcome::DatumPoint(datum_point(input)?),
        OperationType::DatumLine => SarOutcome::DatumLine(datum_line(input)?),
        OperationType::SimpleSar => SarOutcome::SimpleSar(simple_sar(input)?),
    })
}

/// Moves `point` by the first weather sample's current and leeway over
/// `hours`. Simple SAR operations carry no drift and return the point as is.
pub fn apply_drift_to_point(
    input: &SarInput,
    point: GeoPosition,
    hours: f64,
) -> SarResult<GeoPosition> {
    if input.operation_type() == OperationType::SimpleSar {
        return Ok(point);
    }
    point.validate("point")?;
    if !(hours.is_finite() && hours >= 0.0) {
        return Err(SarError::invalid(format!("drift time must be non-negative, got {} h", hours)));
    }
    let sample = input
        .header
        .weather
        .first()
        .ok_or_else(|| SarError::invalid("at least one weather sample is required"))?;
    let profile = input.header.search_object()?;

    let current = find_position(
        point,
        sample.twc_heading_deg,
        nm_to_meters(sample.twc_speed_knots * hours),
    );
    let leeway_nm = profile.leeway_speed(sample.leeway_speed_knots) * hours;
    Ok(find_position(
        current,
        sample.downwind_heading_deg,
        nm_to_meters(leeway_nm),
    ))
}

/// Front door for callers that want logging and counters around each request.
pub struct SarCalculator {
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl SarCalculator {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    fn observe<T>(&self, label: &str, result: SarResult<T>) -> SarResult<T> {
        match &result {
            Ok(_) => {
                self.metrics.record_processed();
                self.logger.record(&format!("{} completed", label));
            }
            Err(err) => {
                self.metrics.record_error(err.kind());
                self.logger.record_failure(label, err);
            }
        }
        result
    }

    pub fn compute(&self, input: &SarInput) -> SarResult<SarOutcome> {
        let label = format!("{:?}", input.operation_type());
        let outcome = self.observe(&label, compute(input))?;
        self.logger.record_outcome(&outcome);
        Ok(outcome)
    }

    pub fn effort_allocation(
        &self,
        input: &EffortAllocationInput,
    ) -> SarResult<EffortAllocationResult> {
        self.observe("effort allocation", effort::compute_effort_allocation(input))
    }

    pub fn project_future(
        &self,
        input: &SarInput,
        offsets_minutes: &[i64],
        workers: usize,
    ) -> SarResult<Vec<ProjectedDatum>> {
        let projection = FutureProjection::new(workers);
        self.observe("future projection", projection.project(input, offsets_minutes))
    }

    pub fn apply_drift_to_point(
        &self,
        input: &SarInput,
        point: GeoPosition,
        hours: f64,
    ) -> SarResult<GeoPosition> {
        self.observe("point drift", apply_drift_to_point(input, point, hours))
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }
}

impl Default for SarCalculator {
    fn default() -> Self {
        Self::new()
    }
}
