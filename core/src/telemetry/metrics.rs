use crate::prelude::ErrorKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Default)]
struct Metrics {
    processed: usize,
    failures: BTreeMap<ErrorKind, usize>,
}

/// Counters at the time of the snapshot; failures are keyed by error kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub processed: usize,
    pub failed: usize,
    pub failures: BTreeMap<ErrorKind, usize>,
}

impl MetricsSnapshot {
    pub fn failures_of(&self, kind: ErrorKind) -> usize {
        self.failures.get(&kind).copied().unwrap_or(0)
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_processed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
        }
    }

    pub fn record_error(&self, kind: ErrorKind) {
        if let Ok(mut metrics) = self.inner.lock() {
            *metrics.failures.entry(kind).or_insert(0) += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                processed: metrics.processed,
                failed: metrics.failures.values().sum(),
                failures: metrics.failures.clone(),
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_counted_per_kind() {
        let recorder = MetricsRecorder::new();
        recorder.record_processed();
        recorder.record_error(ErrorKind::GeometryDegenerate);
        recorder.record_error(ErrorKind::GeometryDegenerate);
        recorder.record_error(ErrorKind::InvalidInput);

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.processed, 1);
        assert_eq!(snapshot.failed, 3);
        assert_eq!(snapshot.failures_of(ErrorKind::GeometryDegenerate), 2);
        assert_eq!(snapshot.failures_of(ErrorKind::Internal), 0);
        assert_eq!(
            snapshot.failures.keys().copied().collect::<Vec<_>>(),
            vec![ErrorKind::InvalidInput, ErrorKind::GeometryDegenerate]
        );

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["failures"]["GeometryDegenerate"], 2);
    }
}
