use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::enrichment::socials_from_page;
use crate::pipeline::{BudgetUsage, RunContext, Stage};
use crate::traits::PageFetcher;

/// Best-effort, budget-capped social enrichment from each scored candidate's
/// own website. Never fails the run.
///
/// The fetch counter moves only when an HTTP exchange completes (any status).
/// Connection-level failures are free.
pub struct WebsiteSocialsStage {
    fetcher: Arc<dyn PageFetcher>,
}

impl WebsiteSocialsStage {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Stage for WebsiteSocialsStage {
    fn name(&self) -> &'static str {
        "website_socials"
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<()> {
        let cap = ctx.plan.website_fetch_cap;

        if !ctx.plan.include_socials {
            info!(search_id = ctx.search_id.as_str(), "Social enrichment disabled by plan");
            ctx.budget_usage = BudgetUsage {
                website_fetches_used: 0,
                website_fetches_cap: cap,
            };
            return Ok(());
        }

        let mut used = 0u32;
        let mut enrichments = HashMap::new();

        for scored in &ctx.scored {
            if used >= cap {
                debug!(search_id = ctx.search_id.as_str(), cap, "Website fetch cap reached");
                break;
            }
            let candidate = &scored.candidate;
            let Some(website) = candidate.website() else {
                continue;
            };

            let page = match self.fetcher.fetch(website).await {
                Ok(page) => page,
                Err(e) => {
                    debug!(url = website, error = %e, "Website fetch did not complete, skipping");
                    continue;
                }
            };
            used += 1;

            if page.is_error_status() {
                debug!(url = website, status = page.status, "Website returned error status, skipping");
                continue;
            }

            if let Some(record) = socials_from_page(&page.body, website) {
                debug!(url = website, networks = record.socials.len(), "Socials found");
                enrichments.insert(candidate.business_key(), record);
            }
        }

        info!(
            search_id = ctx.search_id.as_str(),
            enriched = enrichments.len(),
            website_fetches_used = used,
            website_fetches_cap = cap,
            "Website social enrichment complete"
        );

        ctx.website_enrichments = enrichments;
        ctx.budget_usage = BudgetUsage {
            website_fetches_used: used,
            website_fetches_cap: cap,
        };
        Ok(())
    }
}
