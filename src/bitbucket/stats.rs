use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::types::Pipeline;

/// Running aggregate over every pipeline run sharing one target identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetStats {
    pub success_count: usize,
    pub total_count: usize,
    pub total_build_seconds: u64,
    /// Completion time of the most recent failing run, if one was observed
    pub last_failure_at: Option<DateTime<Utc>>,
    /// Completion time of the most recent successful run, if one was observed
    pub last_success_at: Option<DateTime<Utc>>,
}

/// Fold pipeline runs into per-target statistics.
///
/// `pipelines` must be ordered by creation time, descending - the order the
/// pipelines endpoint returns with `sort=-created_on`. The first success or
/// failure encountered per target is therefore the most recent one, so
/// `last_success_at` and `last_failure_at` are written once and never
/// overwritten. Feeding this an ascending list would silently report the
/// oldest runs instead.
///
/// The returned map iterates targets in first-encountered order, which keeps
/// report rows stable between runs against the same history.
pub fn aggregate(pipelines: &[Pipeline]) -> IndexMap<String, TargetStats> {
    let mut stats: IndexMap<String, TargetStats> = IndexMap::new();

    for pipeline in pipelines {
        let entry = stats.entry(pipeline.target_identity()).or_default();

        entry.total_count += 1;
        entry.total_build_seconds += pipeline.build_seconds_used;

        if pipeline.is_successful() {
            entry.success_count += 1;
            if entry.last_success_at.is_none() {
                entry.last_success_at = pipeline.completed_on;
            }
        } else if entry.last_failure_at.is_none() {
            entry.last_failure_at = pipeline.completed_on;
        }
    }

    stats
}
