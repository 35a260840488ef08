//! Search submission and status tracking around the pipeline.
//!
//! `submit` validates and records a `queued` search; `run` executes it and
//! records the terminal state. The store is injected and owned by whoever
//! builds the orchestrator.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use leadfinder_common::{LeadFinderError, RunStatus, SearchAccepted, SearchRequest, SearchStatus};

use crate::pipeline::{PipelineRunner, RunContext, RunStats};
use crate::traits::RunStore;

// ---------------------------------------------------------------------------
// InMemoryRunStore
// ---------------------------------------------------------------------------

/// Process-local store. Records are lost on restart.
#[derive(Default)]
pub struct InMemoryRunStore {
    runs: RwLock<HashMap<String, SearchStatus>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn put(&self, status: SearchStatus) -> Result<()> {
        self.runs
            .write()
            .await
            .insert(status.search_id.clone(), status);
        Ok(())
    }

    async fn get(&self, search_id: &str) -> Result<Option<SearchStatus>> {
        Ok(self.runs.read().await.get(search_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    runner: PipelineRunner,
    store: Arc<dyn RunStore>,
}

impl Orchestrator {
    pub fn new(runner: PipelineRunner, store: Arc<dyn RunStore>) -> Self {
        Self { runner, store }
    }

    /// Validate and record a new search as `queued`.
    pub async fn submit(&self, request: &SearchRequest) -> Result<SearchAccepted> {
        request.validate()?;

        let search_id = Uuid::new_v4().to_string();
        self.store.put(SearchStatus::queued(&search_id)).await?;
        info!(search_id = search_id.as_str(), query = request.query.as_str(), "Search queued");

        Ok(SearchAccepted {
            search_id,
            status: RunStatus::Queued,
        })
    }

    /// Execute a submitted search and record its terminal state. Pipeline
    /// failures are recorded as `failed` and returned.
    pub async fn run(&self, search_id: &str, request: SearchRequest) -> Result<RunContext> {
        let Some(mut record) = self.store.get(search_id).await? else {
            return Err(LeadFinderError::NotFound(format!("search {search_id}")).into());
        };

        record.status = RunStatus::Running;
        self.store.put(record.clone()).await?;
        info!(search_id, "Search running");

        match self.runner.run(RunContext::new(search_id, request)).await {
            Ok(ctx) => {
                let stats = RunStats::from_context(&ctx);
                info!(search_id, "{stats}");
                self.store.put(completed_status(search_id, &stats)).await?;
                Ok(ctx)
            }
            Err(e) => {
                let message = format!("{e:#}");
                error!(search_id, error = message.as_str(), "Search failed");
                record.status = RunStatus::Failed;
                record.error = Some(message);
                self.store.put(record).await?;
                Err(e)
            }
        }
    }

    pub async fn status(&self, search_id: &str) -> Result<Option<SearchStatus>> {
        self.store.get(search_id).await
    }
}

fn completed_status(search_id: &str, stats: &RunStats) -> SearchStatus {
    let progress = BTreeMap::from([
        ("anchors_total".to_string(), stats.anchors as i64),
        ("anchors_done".to_string(), stats.anchors_done as i64),
        ("candidates_discovered".to_string(), stats.candidates_discovered as i64),
        ("candidates_unique".to_string(), stats.candidates_unique as i64),
        ("leads".to_string(), stats.leads as i64),
    ]);
    let budget_usage = BTreeMap::from([
        ("website_fetches_used".to_string(), stats.website_fetches_used as i64),
        ("website_fetches_cap".to_string(), stats.website_fetches_cap as i64),
        ("paid_enrichments_used".to_string(), 0),
    ]);
    let summary = BTreeMap::from([
        ("lead_count_ready".to_string(), stats.leads as f64),
        ("leads_with_socials".to_string(), stats.leads_with_socials as f64),
        ("mean_score".to_string(), stats.mean_score),
    ]);

    SearchStatus {
        search_id: search_id.to_string(),
        status: RunStatus::Completed,
        progress,
        budget_usage,
        summary,
        error: None,
    }
}
