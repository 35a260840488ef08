use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use leadfinder_common::RawCandidate;

use crate::pipeline::{RunContext, Stage};

/// Collapses duplicate candidates. First occurrence wins and first-seen order
/// is kept; scoring ties are broken on it.
pub struct DedupeStage;

pub fn dedupe(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.dedupe_key()))
        .collect()
}

#[async_trait]
impl Stage for DedupeStage {
    fn name(&self) -> &'static str {
        "dedupe"
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<()> {
        let before = ctx.raw_candidates.len();
        ctx.raw_candidates = dedupe(std::mem::take(&mut ctx.raw_candidates));
        info!(
            search_id = ctx.search_id.as_str(),
            before,
            after = ctx.raw_candidates.len(),
            "Candidates deduplicated"
        );
        Ok(())
    }
}
