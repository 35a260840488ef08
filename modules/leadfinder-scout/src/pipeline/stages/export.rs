use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use leadfinder_common::{LeadFinderError, LeadRecord};

use crate::pipeline::{RunContext, Stage};

#[derive(Serialize)]
struct ExportDocument<'a> {
    results: &'a [LeadRecord],
}

/// Writes `<export_dir>/<search_id>.json`. I/O failures abort the run.
pub struct ExportStage {
    export_dir: PathBuf,
}

impl ExportStage {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }
}

#[async_trait]
impl Stage for ExportStage {
    fn name(&self) -> &'static str {
        "export"
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<()> {
        tokio::fs::create_dir_all(&self.export_dir).await.map_err(|e| {
            LeadFinderError::Export(format!("create {}: {e}", self.export_dir.display()))
        })?;

        let path = self.export_dir.join(format!("{}.json", ctx.search_id));
        let body = serde_json::to_vec_pretty(&ExportDocument {
            results: &ctx.results,
        })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| LeadFinderError::Export(format!("write {}: {e}", path.display())))?;

        info!(search_id = ctx.search_id.as_str(), path = %path.display(), leads = ctx.results.len(), "Export written");
        ctx.export_paths.insert("json".to_string(), path);
        Ok(())
    }
}
