use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use leadfinder_common::{RawCandidate, ScoreFactor, ScoredCandidate};

use crate::pipeline::{RunContext, Stage};

/// Additive lead-quality scoring, then rank and truncate to the target.
pub struct ScoreStage;

pub fn score_candidate(candidate: RawCandidate) -> ScoredCandidate {
    let signals = [
        (ScoreFactor::Website, candidate.website().is_some()),
        (ScoreFactor::Phone, candidate.phone_number().is_some()),
        (ScoreFactor::Address, !candidate.address_full.trim().is_empty()),
        (ScoreFactor::Types, !candidate.categories.is_empty()),
    ];

    let breakdown: BTreeMap<ScoreFactor, f64> = signals
        .into_iter()
        .filter(|(_, present)| *present)
        .map(|(factor, _)| (factor, factor.weight()))
        .collect();

    ScoredCandidate {
        score: breakdown.values().sum(),
        breakdown,
        candidate,
    }
}

/// Stable descending sort, so equal scores keep dedupe order.
pub fn rank(candidates: Vec<RawCandidate>, target_count: usize) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates.into_iter().map(score_candidate).collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(target_count);
    scored
}

#[async_trait]
impl Stage for ScoreStage {
    fn name(&self) -> &'static str {
        "score"
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<()> {
        ctx.scored = rank(ctx.raw_candidates.clone(), ctx.plan.target_count as usize);
        info!(
            search_id = ctx.search_id.as_str(),
            scored = ctx.scored.len(),
            top_score = ctx.scored.first().map(|s| s.score).unwrap_or_default(),
            "Candidates scored"
        );
        Ok(())
    }
}
