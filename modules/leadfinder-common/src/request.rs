use serde::{Deserialize, Serialize};

use crate::error::LeadFinderError;

pub const MIN_TARGET_COUNT: u32 = 1;
pub const MAX_TARGET_COUNT: u32 = 5000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    #[default]
    Basic,
    Pro,
    Enterprise,
}

impl std::str::FromStr for PlanTier {
    type Err = LeadFinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(PlanTier::Basic),
            "pro" => Ok(PlanTier::Pro),
            "enterprise" => Ok(PlanTier::Enterprise),
            other => Err(LeadFinderError::Validation(format!("unknown plan tier: {other}"))),
        }
    }
}

/// Where to look. An explicit center + radius wins; otherwise a fallback
/// anchor is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoScope {
    /// ISO 3166-1 alpha-2, e.g. "CA".
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub cities: Option<Vec<String>>,
    #[serde(default)]
    pub center_lat: Option<f64>,
    #[serde(default)]
    pub center_lng: Option<f64>,
    #[serde(default)]
    pub radius_km: Option<f64>,
}

impl GeoScope {
    pub fn circle(center_lat: f64, center_lng: f64, radius_km: f64) -> Self {
        Self {
            center_lat: Some(center_lat),
            center_lng: Some(center_lng),
            radius_km: Some(radius_km),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(default = "default_true")]
    pub include_socials: bool,
    #[serde(default = "default_true")]
    pub prefer_website_socials: bool,
    #[serde(default)]
    pub max_paid_enrichments: u32,
    /// `None` or `0` means "use the configured default".
    #[serde(default)]
    pub website_fetch_cap: Option<u32>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            include_socials: true,
            prefer_website_socials: true,
            max_paid_enrichments: 0,
            website_fetch_cap: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A lead search as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub geo_scope: GeoScope,
    pub target_count: u32,
    #[serde(default)]
    pub plan: PlanTier,
    #[serde(default)]
    pub options: SearchOptions,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, geo_scope: GeoScope, target_count: u32) -> Self {
        Self {
            query: query.into(),
            geo_scope,
            target_count,
            plan: PlanTier::default(),
            options: SearchOptions::default(),
        }
    }

    /// Boundary validation. The pipeline itself trusts these bounds.
    pub fn validate(&self) -> Result<(), LeadFinderError> {
        if !(MIN_TARGET_COUNT..=MAX_TARGET_COUNT).contains(&self.target_count) {
            return Err(LeadFinderError::Validation(format!(
                "target_count must be between {MIN_TARGET_COUNT} and {MAX_TARGET_COUNT}, got {}",
                self.target_count
            )));
        }
        Ok(())
    }
}
