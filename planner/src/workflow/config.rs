use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use sarcore::processing::default_offsets;
use sarcore::sar_interface::{
    DriftStartPoint, EffortAllocationInput, OperationType, SarHeader, SarInput, SarOperation,
    SearchBox, WeatherSample,
};
use sarcore::GeoPosition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Operator-supplied datum and box corners for a Simple SAR scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleSarConfig {
    pub datum: GeoPosition,
    pub a: GeoPosition,
    pub b: GeoPosition,
    pub c: GeoPosition,
    pub d: GeoPosition,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchUnitConfig {
    pub name: String,
    pub sweep_width_nm: f64,
    pub desired_pod: f64,
    pub ground_speed_kn: f64,
    pub search_time_hours: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub offsets_minutes: Vec<i64>,
    pub workers: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            offsets_minutes: default_offsets(),
            workers: 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub operation: OperationType,
    pub lkp: GeoPosition,
    pub lkp_time: DateTime<Utc>,
    pub css_time: DateTime<Utc>,
    pub x_error_nm: f64,
    pub y_error_nm: f64,
    pub safety_factor: f64,
    pub search_object: i32,
    #[serde(default)]
    pub weather: Vec<WeatherSample>,
    /// DSP2 and DSP3 of a datum line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_start_points: Option<Vec<DriftStartPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_sar: Option<SimpleSarConfig>,
    #[serde(default)]
    pub search_units: Vec<SearchUnitConfig>,
    #[serde(default)]
    pub projection: ProjectionConfig,
}

impl ScenarioConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scenario {}", path_ref.display()))?;
        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing scenario {}", path_ref.display()))?;
        Ok(config)
    }

    fn header(&self) -> SarHeader {
        SarHeader {
            lkp: self.lkp,
            lkp_time: self.lkp_time,
            css_time: self.css_time,
            position_error_x_nm: self.x_error_nm,
            nav_error_y_nm: self.y_error_nm,
            safety_factor: self.safety_factor,
            search_object_id: self.search_object,
            weather: self.weather.clone(),
        }
    }

    fn operation(&self) -> anyhow::Result<SarOperation> {
        Ok(match self.operation {
            OperationType::RapidResponse => SarOperation::RapidResponse,
            OperationType::DatumPoint => SarOperation::DatumPoint,
            OperationType::DatumLine => match self.drift_start_points.as_deref() {
                Some([dsp2, dsp3]) => SarOperation::DatumLine {
                    dsp2: *dsp2,
                    dsp3: *dsp3,
                },
                Some(other) => bail!(
                    "datum line needs exactly two extra drift start points, got {}",
                    other.len()
                ),
                None => bail!("datum line scenario without drift_start_points"),
            },
            OperationType::SimpleSar => {
                let simple = self
                    .simple_sar
                    .as_ref()
                    .context("simple SAR scenario without simple_sar section")?;
                SarOperation::SimpleSar {
                    datum: simple.datum,
                    search_box: SearchBox {
                        a: simple.a,
                        b: simple.b,
                        c: simple.c,
                        d: simple.d,
                    },
                }
            }
        })
    }

    pub fn to_sar_input(&self) -> anyhow::Result<SarInput> {
        Ok(SarInput::new(self.header(), self.operation()?))
    }

    pub fn search_unit_inputs(&self) -> BTreeMap<String, EffortAllocationInput> {
        self.search_units
            .iter()
            .map(|unit| {
                (
                    unit.name.clone(),
                    EffortAllocationInput {
                        sweep_width_nm: unit.sweep_width_nm,
                        desired_pod: unit.desired_pod,
                        ground_speed_kn: unit.ground_speed_kn,
                        search_time_hours: unit.search_time_hours,
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DATUM_LINE: &str = "\
operation: datum_line
lkp: { latitude: 56.0, longitude: 12.0 }
lkp_time: 2026-03-14T08:00:00Z
css_time: 2026-03-14T10:00:00Z
x_error_nm: 1.0
y_error_nm: 0.1
safety_factor: 1.1
search_object: 0
weather:
  - timestamp: 2026-03-14T08:00:00Z
    twc_speed_knots: 0.5
    twc_heading_deg: 90.0
    leeway_speed_knots: 12.0
    downwind_heading_deg: 180.0
drift_start_points:
  - position: { latitude: 56.05, longitude: 12.1 }
    time: 2026-03-14T08:20:00Z
  - position: { latitude: 56.1, longitude: 12.2 }
    time: 2026-03-14T08:40:00Z
search_units:
  - name: lifeboat
    sweep_width_nm: 0.8
    desired_pod: 0.79
    ground_speed_kn: 15.0
    search_time_hours: 3.0
";

    fn load(yaml: &str) -> anyhow::Result<ScenarioConfig> {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(yaml.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        ScenarioConfig::load(&path)
    }

    #[test]
    fn scenario_load_reads_yaml() {
        let cfg = load(DATUM_LINE).unwrap();
        assert_eq!(cfg.operation, OperationType::DatumLine);
        assert_eq!(cfg.weather.len(), 1);
        assert_eq!(cfg.projection, ProjectionConfig::default());
        assert_eq!(cfg.search_unit_inputs().len(), 1);
    }

    #[test]
    fn datum_line_scenario_converts_to_input() {
        let input = load(DATUM_LINE).unwrap().to_sar_input().unwrap();
        assert_eq!(input.drift_start_points().len(), 3);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn datum_line_without_start_points_is_rejected() {
        let mut cfg = load(DATUM_LINE).unwrap();
        cfg.drift_start_points = None;
        assert!(cfg.to_sar_input().is_err());
    }

    #[test]
    fn malformed_yaml_reports_the_path() {
        let err = load("operation: [").unwrap_err();
        assert!(format!("{:#}", err).contains("parsing scenario"));
    }
}
