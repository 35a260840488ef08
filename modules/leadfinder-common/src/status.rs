use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Queued => write!(f, "queued"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Returned to callers when a search is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchAccepted {
    pub search_id: String,
    pub status: RunStatus,
}

/// Status record for one search, as stored and as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStatus {
    pub search_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub progress: BTreeMap<String, i64>,
    #[serde(default)]
    pub budget_usage: BTreeMap<String, i64>,
    #[serde(default)]
    pub summary: BTreeMap<String, f64>,
    /// Failure message for `failed` runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchStatus {
    /// The record written when a search is first accepted.
    pub fn queued(search_id: impl Into<String>) -> Self {
        Self {
            search_id: search_id.into(),
            status: RunStatus::Queued,
            progress: BTreeMap::from([
                ("anchors_total".to_string(), 0),
                ("anchors_done".to_string(), 0),
            ]),
            budget_usage: BTreeMap::from([("paid_enrichments_used".to_string(), 0)]),
            summary: BTreeMap::from([("lead_count_ready".to_string(), 0.0)]),
            error: None,
        }
    }
}
