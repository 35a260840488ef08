//! The lead search pipeline: an ordered list of stages run over one
//! [`RunContext`].
//!
//! Stages run strictly in sequence. A stage reports a non-fatal condition by
//! appending to `ctx.errors` and returning `Ok`; any `Err` aborts the run and
//! no further stages execute. The runner never retries or rolls back.

pub mod context;
pub mod stages;
pub mod stats;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};
use typed_builder::TypedBuilder;

use leadfinder_common::AppConfig;

use crate::traits::{DiscoveryProvider, PageFetcher};

pub use context::{BudgetUsage, Plan, RunContext};
pub use stats::RunStats;

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, ctx: &mut RunContext) -> Result<()>;
}

/// Long-lived collaborators the standard stage list is built from.
#[derive(Clone, TypedBuilder)]
pub struct PipelineDeps {
    pub provider: Arc<dyn DiscoveryProvider>,
    pub fetcher: Arc<dyn PageFetcher>,
    #[builder(default = context::DEFAULT_WEBSITE_FETCH_CAP)]
    pub default_website_fetch_cap: u32,
    #[builder(default = PathBuf::from("./exports"))]
    pub export_dir: PathBuf,
    #[builder(default = stages::discover::DEFAULT_MAX_PAGES_PER_ANCHOR)]
    pub max_pages_per_anchor: u32,
}

impl PipelineDeps {
    pub fn from_config(
        provider: Arc<dyn DiscoveryProvider>,
        fetcher: Arc<dyn PageFetcher>,
        config: &AppConfig,
    ) -> Self {
        Self::builder()
            .provider(provider)
            .fetcher(fetcher)
            .default_website_fetch_cap(config.default_website_fetch_cap)
            .export_dir(config.export_dir.clone())
            .build()
    }
}

pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineRunner {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Planner → anchors → discover → dedupe → score → website socials →
    /// assemble → export.
    pub fn standard(deps: PipelineDeps) -> Self {
        use stages::*;

        Self::new(vec![
            Box::new(PlannerStage::new(deps.default_website_fetch_cap)),
            Box::new(AnchorStage),
            Box::new(DiscoverStage::new(deps.provider).max_pages_per_anchor(deps.max_pages_per_anchor)),
            Box::new(DedupeStage),
            Box::new(ScoreStage),
            Box::new(WebsiteSocialsStage::new(deps.fetcher)),
            Box::new(AssembleStage),
            Box::new(ExportStage::new(deps.export_dir)),
        ])
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, mut ctx: RunContext) -> Result<RunContext> {
        info!(search_id = ctx.search_id.as_str(), stages = self.stages.len(), "Pipeline starting");

        for stage in &self.stages {
            let errors_before = ctx.errors.len();
            stage
                .execute(&mut ctx)
                .await
                .with_context(|| format!("stage '{}' failed", stage.name()))?;

            for err in &ctx.errors[errors_before..] {
                warn!(search_id = ctx.search_id.as_str(), stage = stage.name(), error = err.as_str(), "Stage reported error");
            }
            info!(search_id = ctx.search_id.as_str(), stage = stage.name(), "Stage complete");
        }

        Ok(ctx)
    }
}
