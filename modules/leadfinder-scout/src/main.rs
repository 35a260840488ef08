use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use leadfinder_common::{AppConfig, GeoScope, PlanTier, SearchRequest};
use leadfinder_scout::discovery::GooglePlacesProvider;
use leadfinder_scout::fetcher::HttpPageFetcher;
use leadfinder_scout::orchestrator::{InMemoryRunStore, Orchestrator};
use leadfinder_scout::pipeline::{PipelineDeps, PipelineRunner, RunStats};

#[derive(Parser)]
#[command(name = "leadfinder-scout", about = "Find, score and enrich business leads near a location")]
struct Cli {
    /// Free-text business query, e.g. "coffee shop"
    #[arg(long)]
    query: String,

    #[arg(long, requires_all = ["lng", "radius_km"])]
    lat: Option<f64>,

    #[arg(long, requires_all = ["lat", "radius_km"])]
    lng: Option<f64>,

    #[arg(long, requires_all = ["lat", "lng"])]
    radius_km: Option<f64>,

    #[arg(long, default_value_t = 100)]
    target_count: u32,

    /// Defaults to DEFAULT_WEBSITE_FETCH_CAP
    #[arg(long)]
    website_fetch_cap: Option<u32>,

    /// Skip website social enrichment
    #[arg(long)]
    no_socials: bool,

    /// basic, pro or enterprise
    #[arg(long, default_value = "basic")]
    plan: PlanTier,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env()
        .add_directive("leadfinder=info".parse()?)
        .add_directive("places_client=info".parse()?);
    if cli.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("LeadFinder scout starting...");

    let config = AppConfig::from_env()?;

    let provider = Arc::new(GooglePlacesProvider::from_config(&config)?);
    let fetcher = Arc::new(HttpPageFetcher::new(config.website_fetch_timeout)?);
    let runner = PipelineRunner::standard(PipelineDeps::from_config(provider, fetcher, &config));
    let orchestrator = Orchestrator::new(runner, Arc::new(InMemoryRunStore::new()));

    let geo_scope = match (cli.lat, cli.lng, cli.radius_km) {
        (Some(lat), Some(lng), Some(radius_km)) => GeoScope::circle(lat, lng, radius_km),
        _ => GeoScope::default(),
    };
    let mut request = SearchRequest::new(cli.query, geo_scope, cli.target_count);
    request.plan = cli.plan;
    request.options.include_socials = !cli.no_socials;
    request.options.website_fetch_cap = cli.website_fetch_cap;

    let accepted = orchestrator.submit(&request).await?;
    let ctx = orchestrator.run(&accepted.search_id, request).await?;

    println!("{}", RunStats::from_context(&ctx));
    for (kind, path) in &ctx.export_paths {
        println!("Export ({kind}): {}", path.display());
    }
    for err in &ctx.errors {
        println!("Warning: {err}");
    }

    Ok(())
}
