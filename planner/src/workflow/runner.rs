use crate::workflow::config::ScenarioConfig;
use anyhow::Context;
use log::info;
use sarcore::processing::effort::{allocate_effort, required_search_hours};
use sarcore::sar_interface::{EffortAllocationResult, OperationType, ProjectedDatum, SarOutcome};
use sarcore::SarCalculator;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Effort allocation for one search unit against the computed search area.
#[derive(Clone, Debug, Serialize)]
pub struct EffortRow {
    pub allocation: EffortAllocationResult,
    /// Hours the unit alone needs to sweep the whole search area.
    pub hours_for_area: f64,
}

#[derive(Debug)]
pub struct WorkflowResult {
    pub outcome: SarOutcome,
    pub search_area_nm2: f64,
    pub effort: BTreeMap<String, EffortRow>,
    pub projections: Vec<ProjectedDatum>,
}

#[derive(Clone)]
pub struct Runner {
    calculator: Arc<SarCalculator>,
    project: bool,
}

impl Runner {
    pub fn new(project: bool) -> Self {
        Self {
            calculator: Arc::new(SarCalculator::new()),
            project,
        }
    }

    pub fn calculator(&self) -> &SarCalculator {
        &self.calculator
    }

    pub fn execute(&self, scenario: &ScenarioConfig) -> anyhow::Result<WorkflowResult> {
        let input = scenario
            .to_sar_input()
            .context("building SAR input from scenario")?;

        let outcome = self
            .calculator
            .compute(&input)
            .context("computing datum and search area")?;
        let search_area_nm2 = outcome.search_area_nm2();

        let units = scenario.search_unit_inputs();
        let allocations = allocate_effort(&units).context("allocating search effort")?;
        let mut effort = BTreeMap::new();
        for (name, allocation) in allocations {
            let ground_speed_kn = units
                .get(&name)
                .map(|unit| unit.ground_speed_kn)
                .with_context(|| format!("unknown search unit {}", name))?;
            let hours_for_area =
                required_search_hours(search_area_nm2, allocation.track_spacing_nm, ground_speed_kn)
                    .with_context(|| format!("search hours for unit {}", name))?;
            effort.insert(
                name,
                EffortRow {
                    allocation,
                    hours_for_area,
                },
            );
        }

        let projections = if self.project && scenario.operation == OperationType::SimpleSar {
            info!("simple SAR scenario has no drift, skipping projections");
            Vec::new()
        } else if self.project {
            self.calculator
                .project_future(
                    &input,
                    &scenario.projection.offsets_minutes,
                    scenario.projection.workers,
                )
                .context("projecting future datums")?
        } else {
            Vec::new()
        };

        info!(
            "scenario {:?}: area {:.2} nm2, {} units, {} projections",
            scenario.operation,
            search_area_nm2,
            effort.len(),
            projections.len()
        );

        Ok(WorkflowResult {
            outcome,
            search_area_nm2,
            effort,
            projections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_scenario, GeneratorConfig};
    use crate::workflow::config::SimpleSarConfig;

    #[test]
    fn runner_executes_generated_scenario() {
        let scenario = build_scenario(&GeneratorConfig::default()).unwrap();
        let runner = Runner::new(false);
        let result = runner.execute(&scenario).unwrap();
        assert!(result.search_area_nm2 > 0.0);
        assert_eq!(result.effort.len(), scenario.search_units.len());
        assert!(result.projections.is_empty());
        for row in result.effort.values() {
            assert!(row.hours_for_area > 0.0);
        }
        assert_eq!(runner.calculator().metrics().snapshot().processed, 1);
    }

    #[test]
    fn runner_projects_when_asked() {
        let config = GeneratorConfig {
            operation: OperationType::RapidResponse,
            ..Default::default()
        };
        let mut scenario = build_scenario(&config).unwrap();
        scenario.projection.offsets_minutes = vec![60, 30];
        scenario.projection.workers = 2;
        let result = Runner::new(true).execute(&scenario).unwrap();
        let offsets: Vec<i64> = result.projections.iter().map(|p| p.offset_minutes).collect();
        assert_eq!(offsets, vec![30, 60]);
    }

    #[test]
    fn simple_sar_runs_without_projections() {
        let mut scenario = build_scenario(&GeneratorConfig::default()).unwrap();
        let lkp = scenario.lkp;
        let corner = |dlat: f64, dlon: f64| {
            sarcore::GeoPosition::new(lkp.latitude + dlat, lkp.longitude + dlon)
        };
        scenario.operation = OperationType::SimpleSar;
        scenario.simple_sar = Some(SimpleSarConfig {
            datum: lkp,
            a: corner(0.05, -0.08),
            b: corner(0.05, 0.08),
            c: corner(-0.05, 0.08),
            d: corner(-0.05, -0.08),
        });
        let result = Runner::new(true).execute(&scenario).unwrap();
        assert!(result.projections.is_empty());
        assert_eq!(result.outcome.datum(), lkp);
        assert!(result.search_area_nm2 > 0.0);
    }

    #[test]
    fn invalid_scenario_fails_with_context() {
        let mut scenario = build_scenario(&GeneratorConfig::default()).unwrap();
        scenario.safety_factor = -1.0;
        let err = Runner::new(false).execute(&scenario).unwrap_err();
        assert!(format!("{:#}", err).contains("computing datum and search area"));
    }
}
