use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::bitbucket::TargetStats;

/// One rendered line of a repository's pipeline report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub target: String,
    /// "successes/total (pct%)"
    pub success: String,
    /// Success percentage, kept numeric to drive cell colors
    pub success_rate: f64,
    /// Average build seconds per run
    pub avg_time: String,
    pub last_failure: String,
    pub last_success: String,
}

/// Derive report rows from aggregated stats, one per target, in the map's
/// iteration order.
pub fn build_rows(stats: &IndexMap<String, TargetStats>) -> Vec<ReportRow> {
    stats
        .iter()
        .map(|(target, stats)| ReportRow {
            target: target.clone(),
            success: format_success(stats),
            success_rate: success_rate(stats),
            avg_time: format_avg_time(stats),
            last_failure: format_timestamp(stats.last_failure_at),
            last_success: format_timestamp(stats.last_success_at),
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(stats: &TargetStats) -> f64 {
    100.0 * stats.success_count as f64 / stats.total_count as f64
}

fn format_success(stats: &TargetStats) -> String {
    format!(
        "{}/{} ({:.1}%)",
        stats.success_count,
        stats.total_count,
        success_rate(stats)
    )
}

#[allow(clippy::cast_precision_loss)]
fn format_avg_time(stats: &TargetStats) -> String {
    let avg = stats.total_build_seconds as f64 / stats.total_count as f64;
    format!("{avg:.1} seconds")
}

fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp.map_or_else(
        || "N/A".to_string(),
        |timestamp| timestamp.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}
