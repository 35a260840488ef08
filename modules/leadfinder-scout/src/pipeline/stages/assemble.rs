use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use leadfinder_common::{EnrichmentRecord, LeadRecord, ScoredCandidate};

use crate::pipeline::{RunContext, Stage};

/// Merges scored candidates with their enrichment into final lead records,
/// one per scored candidate, same order.
pub struct AssembleStage;

pub fn assemble_lead(
    scored: &ScoredCandidate,
    enrichments: &HashMap<String, EnrichmentRecord>,
) -> LeadRecord {
    let c = &scored.candidate;
    let business_key = c.business_key();
    let enrichment = enrichments.get(&business_key);

    LeadRecord {
        name: c.name.clone(),
        address_full: c.address_full.clone(),
        phone: c.phone.clone(),
        website_url: c.website_url.clone(),
        categories: c.categories.clone(),
        score: scored.score,
        score_breakdown: scored.breakdown.clone(),
        socials: enrichment.map(|e| e.socials.clone()).unwrap_or_else(BTreeMap::new),
        social_confidence: enrichment.map(|e| e.confidence).unwrap_or(0.0),
        social_reasons: enrichment.map(|e| e.reasons.clone()).unwrap_or_default(),
        needs_review: false,
        business_key,
    }
}

#[async_trait]
impl Stage for AssembleStage {
    fn name(&self) -> &'static str {
        "assemble"
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<()> {
        ctx.results = ctx
            .scored
            .iter()
            .map(|s| assemble_lead(s, &ctx.website_enrichments))
            .collect();
        info!(search_id = ctx.search_id.as_str(), leads = ctx.results.len(), "Leads assembled");
        Ok(())
    }
}
