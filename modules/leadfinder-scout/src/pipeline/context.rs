use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use leadfinder_common::{
    Anchor, EnrichmentRecord, LeadRecord, RawCandidate, ScoredCandidate, SearchRequest,
};

pub const DEFAULT_TARGET_COUNT: u32 = 100;
pub const DEFAULT_WEBSITE_FETCH_CAP: u32 = 400;

/// Execution parameters derived from the request by the planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub target_count: u32,
    pub website_fetch_cap: u32,
    pub include_socials: bool,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            website_fetch_cap: DEFAULT_WEBSITE_FETCH_CAP,
            include_socials: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetUsage {
    pub website_fetches_used: u32,
    pub website_fetches_cap: u32,
}

/// The single mutable accumulator threaded through one pipeline execution.
///
/// Write ownership, one stage per field:
/// - `plan`: planner
/// - `anchors`: anchors
/// - `raw_candidates`, `candidates_discovered`, `anchors_done`: discover
///   (`raw_candidates` is then narrowed in place by dedupe)
/// - `scored`: score
/// - `website_enrichments`, `budget_usage`: website socials
/// - `results`: assemble
/// - `export_paths`: export
/// - `errors`: any stage, append-only
#[derive(Debug, Clone)]
pub struct RunContext {
    pub search_id: String,
    pub request: SearchRequest,
    pub started_at: DateTime<Utc>,
    pub plan: Plan,
    pub anchors: Vec<Anchor>,
    pub anchors_done: usize,
    pub raw_candidates: Vec<RawCandidate>,
    /// Raw count before dedupe.
    pub candidates_discovered: usize,
    pub scored: Vec<ScoredCandidate>,
    /// Keyed by business key (`"<source>:<source_id>"`).
    pub website_enrichments: HashMap<String, EnrichmentRecord>,
    pub results: Vec<LeadRecord>,
    pub budget_usage: BudgetUsage,
    pub export_paths: BTreeMap<String, PathBuf>,
    pub errors: Vec<String>,
}

impl RunContext {
    pub fn new(search_id: impl Into<String>, request: SearchRequest) -> Self {
        Self {
            search_id: search_id.into(),
            request,
            started_at: Utc::now(),
            plan: Plan::default(),
            anchors: Vec::new(),
            anchors_done: 0,
            raw_candidates: Vec::new(),
            candidates_discovered: 0,
            scored: Vec::new(),
            website_enrichments: HashMap::new(),
            results: Vec::new(),
            budget_usage: BudgetUsage::default(),
            export_paths: BTreeMap::new(),
            errors: Vec::new(),
        }
    }
}
