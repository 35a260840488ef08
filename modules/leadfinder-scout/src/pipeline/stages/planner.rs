use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use leadfinder_common::SearchRequest;

use crate::pipeline::{Plan, RunContext, Stage};

/// Derives the execution plan from the request. No I/O.
pub struct PlannerStage {
    default_website_fetch_cap: u32,
}

impl PlannerStage {
    pub fn new(default_website_fetch_cap: u32) -> Self {
        Self {
            default_website_fetch_cap,
        }
    }
}

/// Target count is taken as given (bounds are checked at submission). A
/// missing or zero fetch cap falls back to the configured default.
pub fn plan_for(request: &SearchRequest, default_website_fetch_cap: u32) -> Plan {
    Plan {
        target_count: request.target_count,
        website_fetch_cap: request
            .options
            .website_fetch_cap
            .filter(|cap| *cap > 0)
            .unwrap_or(default_website_fetch_cap),
        include_socials: request.options.include_socials,
    }
}

#[async_trait]
impl Stage for PlannerStage {
    fn name(&self) -> &'static str {
        "planner"
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<()> {
        ctx.plan = plan_for(&ctx.request, self.default_website_fetch_cap);
        info!(
            search_id = ctx.search_id.as_str(),
            target_count = ctx.plan.target_count,
            website_fetch_cap = ctx.plan.website_fetch_cap,
            include_socials = ctx.plan.include_socials,
            "Plan ready"
        );
        Ok(())
    }
}
