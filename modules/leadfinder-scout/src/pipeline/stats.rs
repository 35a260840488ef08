use super::RunContext;

/// Stats from a lead search run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub anchors: u32,
    pub anchors_done: u32,
    pub candidates_discovered: u32,
    pub candidates_unique: u32,
    pub scored: u32,
    pub leads: u32,
    pub leads_with_socials: u32,
    pub website_fetches_used: u32,
    pub website_fetches_cap: u32,
    pub errors: u32,
    pub mean_score: f64,
    pub elapsed_ms: i64,
}

impl RunStats {
    pub fn from_context(ctx: &RunContext) -> Self {
        let leads = ctx.results.len();
        let mean_score = if leads == 0 {
            0.0
        } else {
            ctx.results.iter().map(|r| r.score).sum::<f64>() / leads as f64
        };

        Self {
            anchors: ctx.anchors.len() as u32,
            anchors_done: ctx.anchors_done as u32,
            candidates_discovered: ctx.candidates_discovered as u32,
            candidates_unique: ctx.raw_candidates.len() as u32,
            scored: ctx.scored.len() as u32,
            leads: leads as u32,
            leads_with_socials: ctx.results.iter().filter(|r| !r.socials.is_empty()).count() as u32,
            website_fetches_used: ctx.budget_usage.website_fetches_used,
            website_fetches_cap: ctx.budget_usage.website_fetches_cap,
            errors: ctx.errors.len() as u32,
            mean_score,
            elapsed_ms: (chrono::Utc::now() - ctx.started_at).num_milliseconds(),
        }
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Lead Search Complete ===")?;
        writeln!(f, "Anchors searched:   {}/{}", self.anchors_done, self.anchors)?;
        writeln!(f, "Candidates found:   {}", self.candidates_discovered)?;
        writeln!(f, "Unique candidates:  {}", self.candidates_unique)?;
        writeln!(f, "Scored:             {}", self.scored)?;
        writeln!(f, "Leads:              {}", self.leads)?;
        writeln!(f, "Mean score:         {:.2}", self.mean_score)?;
        writeln!(f, "\nEnrichment:")?;
        writeln!(
            f,
            "  Website fetches:  {}/{}",
            self.website_fetches_used, self.website_fetches_cap
        )?;
        let total = self.leads.max(1);
        writeln!(
            f,
            "  With socials:     {} ({:.0}%)",
            self.leads_with_socials,
            self.leads_with_socials as f64 / total as f64 * 100.0
        )?;
        if self.errors > 0 {
            writeln!(f, "\nErrors:             {}", self.errors)?;
        }
        writeln!(f, "Elapsed:            {}ms", self.elapsed_ms)?;
        Ok(())
    }
}
