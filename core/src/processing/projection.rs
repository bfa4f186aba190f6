//! Future datum projections.
//!
//! Each projection re-runs the whole operation with the commence-search-start
//! time pushed forward. The runs share nothing, so they are fanned out over a
//! small tokio worker pool and collected back in offset order.

use crate::prelude::{SarError, SarResult};
use crate::processing::calculator::compute;
use crate::sar_interface::{OperationType, ProjectedDatum, SarInput};
use log::{debug, info};
use tokio::task::JoinSet;

pub const DEFAULT_STEP_MINUTES: i64 = 30;
pub const DEFAULT_STEPS: i64 = 8;

/// 30, 60, ... 240 minutes past the commence search start.
pub fn default_offsets() -> Vec<i64> {
    (1..=DEFAULT_STEPS).map(|i| i * DEFAULT_STEP_MINUTES).collect()
}

fn project_shifted(shifted: &SarInput, offset_minutes: i64) -> SarResult<ProjectedDatum> {
    Ok(ProjectedDatum {
        offset_minutes,
        outcome: compute(shifted)?,
    })
}

pub fn project_one(input: &SarInput, offset_minutes: i64) -> SarResult<ProjectedDatum> {
    project_shifted(&input.with_css_offset(offset_minutes)?, offset_minutes)
}

/// Shifts the request once per offset; an offset past the calendar range
/// rejects the whole batch before anything runs.
fn shifted_inputs(input: &SarInput, offsets_minutes: &[i64]) -> SarResult<Vec<(i64, SarInput)>> {
    offsets_minutes
        .iter()
        .map(|offset| Ok((*offset, input.with_css_offset(*offset)?)))
        .collect()
}

fn check_projectable(input: &SarInput) -> SarResult<()> {
    if input.operation_type() == OperationType::SimpleSar {
        return Err(SarError::invalid(
            "simple SAR operations carry no drift to project",
        ));
    }
    Ok(())
}

pub struct FutureProjection {
    workers: usize,
}

impl FutureProjection {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every offset in turn on the calling thread.
    pub fn project_sequential(
        &self,
        input: &SarInput,
        offsets_minutes: &[i64],
    ) -> SarResult<Vec<ProjectedDatum>> {
        check_projectable(input)?;
        let mut projected = shifted_inputs(input, offsets_minutes)?
            .iter()
            .map(|(offset, shifted)| project_shifted(shifted, *offset))
            .collect::<SarResult<Vec<_>>>()?;
        projected.sort_by_key(|p| p.offset_minutes);
        Ok(projected)
    }

    /// Runs the offsets concurrently; the result is ordered by offset and the
    /// first failing projection fails the batch.
    pub fn project(
        &self,
        input: &SarInput,
        offsets_minutes: &[i64],
    ) -> SarResult<Vec<ProjectedDatum>> {
        check_projectable(input)?;
        let shifted = shifted_inputs(input, offsets_minutes)?;
        if shifted.is_empty() {
            return Ok(Vec::new());
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.workers)
            .thread_name("sar-projection")
            .build()
            .map_err(|err| SarError::Internal(format!("projection pool: {}", err)))?;

        let mut projected = runtime.block_on(async move {
            let mut tasks = JoinSet::new();
            for (offset, request) in shifted {
                tasks.spawn(async move { project_shifted(&request, offset) });
            }

            let mut collected = Vec::with_capacity(tasks.len());
            while let Some(joined) = tasks.join_next().await {
                let datum = joined
                    .map_err(|err| SarError::Internal(format!("projection task: {}", err)))??;
                debug!("projected datum at +{} min", datum.offset_minutes);
                collected.push(datum);
            }
            Ok::<_, SarError>(collected)
        })?;

        projected.sort_by_key(|p| p.offset_minutes);
        info!(
            "projected {} future datums on {} workers",
            projected.len(),
            self.workers
        );
        Ok(projected)
    }
}

impl Default for FutureProjection {
    fn default() -> Self {
        Self::new(4)
    }
}
