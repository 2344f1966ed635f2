use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One repository in a workspace listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// URL-safe repository identifier
    pub slug: String,
    /// Display name
    pub name: String,
    /// When the repository was last updated
    pub updated_on: Option<DateTime<Utc>>,
}

/// One pipeline run. Listings are ordered newest first (`sort=-created_on`).
#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    /// What the pipeline ran against (branch, tag, ...)
    pub target: PipelineTarget,
    /// Current state, including the result once completed
    pub state: PipelineState,
    /// Build minutes consumed, in seconds
    #[serde(default)]
    pub build_seconds_used: u64,
    /// Completion time; absent while the pipeline is still running
    pub completed_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineTarget {
    pub selector: Selector,
}

/// Trigger descriptor: selector kind (branch, tag, custom, default) plus the
/// pattern it matched. `pattern` is absent on the wire for `default`
/// selectors.
#[derive(Debug, Clone, Deserialize)]
pub struct Selector {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineState {
    /// Absent until the pipeline completes
    pub result: Option<StateResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateResult {
    pub name: String,
}

impl Pipeline {
    /// Aggregation key for this run's trigger target.
    pub fn target_identity(&self) -> String {
        format!(
            "{}::{}",
            self.target.selector.kind, self.target.selector.pattern
        )
    }

    /// Anything other than a completed `SUCCESSFUL` result counts as
    /// unsuccessful, including runs still in progress.
    pub fn is_successful(&self) -> bool {
        self.state
            .result
            .as_ref()
            .is_some_and(|result| result.name == "SUCCESSFUL")
    }
}
