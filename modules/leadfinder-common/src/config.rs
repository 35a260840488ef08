use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::LeadFinderError;

pub const GOOGLE_PLACES_PROVIDER: &str = "google_places";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Discovery
    pub discovery_provider: String,
    pub google_places_api_key: String,
    pub places_language_code: String,
    pub places_region_code: Option<String>,
    pub places_timeout: Duration,
    pub places_max_retries: u32,
    pub places_base_backoff: Duration,

    // Enrichment
    pub website_fetch_timeout: Duration,
    pub default_website_fetch_cap: u32,

    // Export
    pub export_dir: PathBuf,

    // API layer shared secret (checked outside this workspace)
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            discovery_provider: env_or("DISCOVERY_PROVIDER", GOOGLE_PLACES_PROVIDER),
            google_places_api_key: std::env::var("GOOGLE_PLACES_API_KEY")
                .context("GOOGLE_PLACES_API_KEY environment variable is required")?,
            places_language_code: env_or("PLACES_LANGUAGE_CODE", "en"),
            places_region_code: Some(env_or("PLACES_REGION_CODE", "CA"))
                .filter(|r| !r.is_empty()),
            places_timeout: Duration::from_secs(parse_env("PLACES_TIMEOUT_SECS", 20)?),
            places_max_retries: parse_env("PLACES_MAX_RETRIES", 4)?,
            places_base_backoff: Duration::from_millis(parse_env("PLACES_BASE_BACKOFF_MS", 600)?),
            website_fetch_timeout: Duration::from_secs(parse_env(
                "WEBSITE_FETCH_TIMEOUT_SECS",
                15,
            )?),
            default_website_fetch_cap: parse_env("DEFAULT_WEBSITE_FETCH_CAP", 400)?,
            export_dir: PathBuf::from(env_or("EXPORT_DIR", "./exports")),
            api_key: std::env::var("LEADFINDER_API_KEY").ok().filter(|k| !k.is_empty()),
        };

        config.validate()?;
        config.log_keys();
        Ok(config)
    }

    fn validate(&self) -> Result<(), LeadFinderError> {
        if self.google_places_api_key.is_empty() {
            return Err(LeadFinderError::Config(
                "GOOGLE_PLACES_API_KEY must not be empty".into(),
            ));
        }
        if self.discovery_provider != GOOGLE_PLACES_PROVIDER {
            return Err(LeadFinderError::Config(format!(
                "unsupported DISCOVERY_PROVIDER '{}' (only '{GOOGLE_PLACES_PROVIDER}' is available)",
                self.discovery_provider
            )));
        }
        Ok(())
    }

    fn log_keys(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  DISCOVERY_PROVIDER: {}", self.discovery_provider);
        tracing::info!("  GOOGLE_PLACES_API_KEY: {}", preview(&self.google_places_api_key));
        tracing::info!("  PLACES_REGION_CODE: {}", self.places_region_code.as_deref().unwrap_or("<none>"));
        tracing::info!("  DEFAULT_WEBSITE_FETCH_CAP: {}", self.default_website_fetch_cap);
        tracing::info!("  EXPORT_DIR: {}", self.export_dir.display());
        tracing::info!("  LEADFINDER_API_KEY: {}", preview_opt(&self.api_key));
    }
}

/// First five characters of a secret for the startup log.
fn preview(val: &str) -> String {
    let head: String = val.chars().take(5).collect();
    format!("{head}...({} chars)", val.chars().count())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional numeric env var. Present-but-malformed is an error.
fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, LeadFinderError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| LeadFinderError::Config(format!("{key} must be a number, got '{raw}'"))),
        _ => Ok(default),
    }
}
