use crate::geo::rhumb::reverse_direction;
use crate::geo::GeoPosition;
use crate::leeway::{profile, SearchObjectProfile};
use crate::prelude::{SarError, SarResult};
use crate::sar_interface::result::SearchBox;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Observed drift conditions from `timestamp` until the next sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: DateTime<Utc>,
    pub twc_speed_knots: f64,
    pub twc_heading_deg: f64,
    /// Wind speed driving the leeway regression.
    pub leeway_speed_knots: f64,
    /// Direction the object is pushed toward (opposite the wind-from direction).
    pub downwind_heading_deg: f64,
}

impl WeatherSample {
    pub fn from_wind_direction(
        timestamp: DateTime<Utc>,
        twc_speed_knots: f64,
        twc_heading_deg: f64,
        wind_speed_knots: f64,
        wind_from_deg: f64,
    ) -> Self {
        Self {
            timestamp,
            twc_speed_knots,
            twc_heading_deg,
            leeway_speed_knots: wind_speed_knots,
            downwind_heading_deg: reverse_direction(wind_from_deg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    RapidResponse,
    DatumPoint,
    DatumLine,
    SimpleSar,
}

/// Inputs shared by every operation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarHeader {
    pub lkp: GeoPosition,
    pub lkp_time: DateTime<Utc>,
    pub css_time: DateTime<Utc>,
    /// Initial position error X, nm.
    pub position_error_x_nm: f64,
    /// SRU navigational error Y, nm.
    pub nav_error_y_nm: f64,
    pub safety_factor: f64,
    pub search_object_id: i32,
    pub weather: Vec<WeatherSample>,
}

impl SarHeader {
    pub fn elapsed_hours(&self) -> f64 {
        hours_between(self.lkp_time, self.css_time)
    }

    pub fn search_object(&self) -> SarResult<SearchObjectProfile> {
        profile(self.search_object_id)
    }

    fn validate(&self, require_weather: bool) -> SarResult<()> {
        self.lkp.validate("LKP")?;
        self.search_object()?;

        if !(self.safety_factor.is_finite() && self.safety_factor > 0.0) {
            return Err(SarError::invalid(format!(
                "safety factor must be positive, got {}",
                self.safety_factor
            )));
        }
        for (label, value) in [
            ("position error X", self.position_error_x_nm),
            ("navigational error Y", self.nav_error_y_nm),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SarError::invalid(format!(
                    "{} must be a non-negative distance, got {}",
                    label, value
                )));
            }
        }
        if self.css_time <= self.lkp_time {
            return Err(SarError::invalid(format!(
                "CSS {} must be after LKP time {}",
                self.css_time, self.lkp_time
            )));
        }

        if !require_weather {
            return Ok(());
        }
        if self.weather.is_empty() {
            return Err(SarError::invalid("at least one weather sample is required"));
        }
        for pair in self.weather.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(SarError::invalid(format!(
                    "weather samples out of order: {} follows {}",
                    pair[1].timestamp, pair[0].timestamp
                )));
            }
        }
        for sample in &self.weather {
            let values = [
                sample.twc_speed_knots,
                sample.twc_heading_deg,
                sample.leeway_speed_knots,
                sample.downwind_heading_deg,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(SarError::invalid(format!(
                    "weather sample at {} has non-finite values",
                    sample.timestamp
                )));
            }
            if sample.twc_speed_knots < 0.0 || sample.leeway_speed_knots < 0.0 {
                return Err(SarError::invalid(format!(
                    "weather sample at {} has a negative speed",
                    sample.timestamp
                )));
            }
        }
        Ok(())
    }
}

/// Position and time of a datum-line drift start point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftStartPoint {
    pub position: GeoPosition,
    pub time: DateTime<Utc>,
}

/// Operation-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SarOperation {
    RapidResponse,
    DatumPoint,
    /// DSP1 is the header LKP; DSP2 and DSP3 follow along the datum line.
    DatumLine { dsp2: DriftStartPoint, dsp3: DriftStartPoint },
    /// Operator-supplied datum and search box; no drift is applied.
    SimpleSar { datum: GeoPosition, search_box: SearchBox },
}

impl SarOperation {
    pub fn operation_type(&self) -> OperationType {
        match self {
            SarOperation::RapidResponse => OperationType::RapidResponse,
            SarOperation::DatumPoint => OperationType::DatumPoint,
            SarOperation::DatumLine { .. } => OperationType::DatumLine,
            SarOperation::SimpleSar { .. } => OperationType::SimpleSar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarInput {
    pub header: SarHeader,
    pub operation: SarOperation,
}

impl SarInput {
    pub fn new(header: SarHeader, operation: SarOperation) -> Self {
        Self { header, operation }
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation.operation_type()
    }

    /// Eager validation; nothing is computed for a rejected input.
    pub fn validate(&self) -> SarResult<()> {
        match &self.operation {
            SarOperation::RapidResponse | SarOperation::DatumPoint => self.header.validate(true),
            SarOperation::DatumLine { dsp2, dsp3 } => {
                self.header.validate(true)?;
                for (label, dsp) in [("DSP2", dsp2), ("DSP3", dsp3)] {
                    dsp.position.validate(label)?;
                    if self.header.css_time <= dsp.time {
                        return Err(SarError::invalid(format!(
                            "CSS must be after the {} time {}",
                            label, dsp.time
                        )));
                    }
                }
                Ok(())
            }
            SarOperation::SimpleSar { datum, search_box } => {
                self.header.validate(false)?;
                datum.validate("datum")?;
                for (label, corner) in ["A", "B", "C", "D"].iter().zip(search_box.corners()) {
                    corner.validate(&format!("corner {}", label))?;
                }
                Ok(())
            }
        }
    }

    /// Drift start points in datum-line order; a single LKP otherwise.
    pub fn drift_start_points(&self) -> Vec<DriftStartPoint> {
        let dsp1 = DriftStartPoint {
            position: self.header.lkp,
            time: self.header.lkp_time,
        };
        match &self.operation {
            SarOperation::DatumLine { dsp2, dsp3 } => vec![dsp1, *dsp2, *dsp3],
            _ => vec![dsp1],
        }
    }

    /// Header of the datum point computed from one drift start point.
    pub fn header_for(&self, dsp: &DriftStartPoint) -> SarHeader {
        SarHeader {
            lkp: dsp.position,
            lkp_time: dsp.time,
            ..self.header.clone()
        }
    }

    /// Same request with the commence-search-start time moved by `minutes`.
    pub fn with_css_offset(&self, minutes: i64) -> SarResult<Self> {
        let css_time = Duration::try_minutes(minutes)
            .and_then(|offset| self.header.css_time.checked_add_signed(offset))
            .ok_or_else(|| {
                SarError::invalid(format!("CSS offset of {} min is out of range", minutes))
            })?;
        let mut shifted = self.clone();
        shifted.header.css_time = css_time;
        Ok(shifted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffortAllocationInput {
    pub sweep_width_nm: f64,
    /// Desired probability of detection, strictly between 0 and 1.
    pub desired_pod: f64,
    pub ground_speed_kn: f64,
    pub search_time_hours: f64,
}

pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 3_600_000.0
}
