use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::pipeline::{RunContext, Stage};
use crate::traits::DiscoveryProvider;

/// Safety valve against a provider that never stops handing out tokens
/// while returning empty pages.
pub const DEFAULT_MAX_PAGES_PER_ANCHOR: u32 = 100;

/// Drives the provider's pagination across anchors until the target is met.
pub struct DiscoverStage {
    provider: Arc<dyn DiscoveryProvider>,
    max_pages_per_anchor: u32,
}

impl DiscoverStage {
    pub fn new(provider: Arc<dyn DiscoveryProvider>) -> Self {
        Self {
            provider,
            max_pages_per_anchor: DEFAULT_MAX_PAGES_PER_ANCHOR,
        }
    }

    pub fn max_pages_per_anchor(mut self, max_pages: u32) -> Self {
        self.max_pages_per_anchor = max_pages.max(1);
        self
    }
}

#[async_trait]
impl Stage for DiscoverStage {
    fn name(&self) -> &'static str {
        "discover"
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<()> {
        let query = ctx.request.query.trim().to_string();
        if query.is_empty() {
            ctx.errors.push("empty query".to_string());
            return Ok(());
        }

        let target = ctx.plan.target_count as usize;
        let mut raw = Vec::new();
        let mut anchors_done = 0;

        for (i, anchor) in ctx.anchors.iter().enumerate() {
            let mut token: Option<String> = None;
            let mut pages = 0u32;

            loop {
                let page = self
                    .provider
                    .search(&query, anchor, token.as_deref())
                    .await
                    .with_context(|| {
                        format!("{} search failed (anchor {i}, page {pages})", self.provider.name())
                    })?;
                pages += 1;

                debug!(
                    search_id = ctx.search_id.as_str(),
                    anchor = i,
                    page = pages,
                    candidates = page.candidates.len(),
                    "Discovery page"
                );
                raw.extend(page.candidates);
                token = page.next_page_token.filter(|t| !t.is_empty());

                if raw.len() >= target || token.is_none() {
                    break;
                }
                if pages >= self.max_pages_per_anchor {
                    warn!(
                        search_id = ctx.search_id.as_str(),
                        anchor = i,
                        pages,
                        "Page limit reached for anchor, moving on"
                    );
                    break;
                }
            }

            anchors_done += 1;
            if raw.len() >= target {
                break;
            }
        }

        info!(
            search_id = ctx.search_id.as_str(),
            provider = self.provider.name(),
            candidates = raw.len(),
            anchors_done,
            "Discovery complete"
        );

        ctx.candidates_discovered = raw.len();
        ctx.anchors_done = anchors_done;
        ctx.raw_candidates = raw;
        Ok(())
    }
}
