use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// --- Geo ---

/// A search circle with the number of candidates it should contribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub center_lat: f64,
    pub center_lng: f64,
    pub radius_km: f64,
    pub quota: u32,
}

// --- Discovery ---

/// A business as reported by a discovery provider, normalized but not yet
/// deduplicated or scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Provider identifier, e.g. "google_places".
    pub source: String,
    /// Provider-native id. Absent or empty ids fall back to name+address identity.
    pub source_id: Option<String>,
    /// Provider response kept for provenance. Never inspected downstream.
    pub payload: serde_json::Value,

    pub name: String,
    pub address_full: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub phone: Option<String>,
    pub website_url: Option<String>,
    pub categories: Vec<String>,
}

/// Synthetic source tag used for candidates without a provider id.
pub const FALLBACK_SOURCE: &str = "fallback";

/// Identity used to collapse duplicate candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupeKey {
    Source { source: String, source_id: String },
    /// Normalized `(name, address)`.
    Fallback(String, String),
}

impl std::fmt::Display for DedupeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DedupeKey::Source { source, source_id } => write!(f, "{source}:{source_id}"),
            DedupeKey::Fallback(name, address) => {
                write!(f, "{FALLBACK_SOURCE}:{name}|{address}")
            }
        }
    }
}

/// Lowercase and collapse runs of whitespace to a single space.
pub fn normalize_text(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

impl RawCandidate {
    /// The provider id, if present and non-empty.
    pub fn provider_id(&self) -> Option<&str> {
        self.source_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn dedupe_key(&self) -> DedupeKey {
        match self.provider_id() {
            Some(id) => DedupeKey::Source {
                source: self.source.clone(),
                source_id: id.to_string(),
            },
            None => DedupeKey::Fallback(
                normalize_text(&self.name),
                normalize_text(&self.address_full),
            ),
        }
    }

    /// `"<source>:<source_id>"`. Enrichments and leads are joined on this.
    pub fn business_key(&self) -> String {
        self.dedupe_key().to_string()
    }

    pub fn website(&self) -> Option<&str> {
        non_empty(self.website_url.as_deref())
    }

    pub fn phone_number(&self) -> Option<&str> {
        non_empty(self.phone.as_deref())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

// --- Scoring ---

/// Lead-quality signals, each worth a fixed weight when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Website,
    Phone,
    Address,
    Types,
}

impl ScoreFactor {
    pub fn weight(self) -> f64 {
        match self {
            ScoreFactor::Website => 3.0,
            ScoreFactor::Phone => 2.0,
            ScoreFactor::Address => 1.0,
            ScoreFactor::Types => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub score: f64,
    /// Only the factors that fired.
    pub breakdown: BTreeMap<ScoreFactor, f64>,
    pub candidate: RawCandidate,
}

// --- Enrichment ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialNetwork {
    Instagram,
    Facebook,
    Linkedin,
    Tiktok,
    X,
    Youtube,
}

impl std::fmt::Display for SocialNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SocialNetwork::Instagram => write!(f, "instagram"),
            SocialNetwork::Facebook => write!(f, "facebook"),
            SocialNetwork::Linkedin => write!(f, "linkedin"),
            SocialNetwork::Tiktok => write!(f, "tiktok"),
            SocialNetwork::X => write!(f, "x"),
            SocialNetwork::Youtube => write!(f, "youtube"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentMethod {
    Website,
}

/// Reason tag attached to every social link found on a business website.
pub const REASON_LINKED_FROM_WEBSITE: &str = "linked_from_website";

/// Confidence assigned to social links scraped from a business's own website.
pub const WEBSITE_SOCIAL_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub socials: BTreeMap<SocialNetwork, String>,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub source: EnrichmentMethod,
}

// --- Output ---

/// A final, exportable lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub business_key: String,
    pub name: String,
    pub address_full: String,
    pub phone: Option<String>,
    pub website_url: Option<String>,
    pub categories: Vec<String>,
    pub score: f64,
    pub score_breakdown: BTreeMap<ScoreFactor, f64>,
    pub socials: BTreeMap<SocialNetwork, String>,
    pub social_confidence: f64,
    pub social_reasons: Vec<String>,
    /// Placeholder: nothing sets this yet.
    pub needs_review: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(source_id: Option<&str>, name: &str, address: &str) -> RawCandidate {
        RawCandidate {
            source: "google_places".into(),
            source_id: source_id.map(String::from),
            payload: serde_json::Value::Null,
            name: name.into(),
            address_full: address.into(),
            city: None,
            region: None,
            country: None,
            lat: None,
            lng: None,
            phone: None,
            website_url: None,
            categories: vec![],
        }
    }

    #[test]
    fn provider_id_drives_business_key() {
        let c = candidate(Some("abc"), "Acme", "1 Main St");
        assert_eq!(c.business_key(), "google_places:abc");
    }

    #[test]
    fn empty_source_id_falls_back_to_name_and_address() {
        let a = candidate(Some(""), "  Acme   Coffee ", "1 Main  St");
        let b = candidate(None, "acme coffee", "1 MAIN ST");
        assert_eq!(a.dedupe_key(), b.dedupe_key());
        assert_eq!(a.business_key(), "fallback:acme coffee|1 main st");
    }

    #[test]
    fn pipe_in_name_does_not_merge_fallback_identities() {
        let a = candidate(None, "a|b", "c");
        let b = candidate(None, "a", "b|c");
        assert_ne!(a.dedupe_key(), b.dedupe_key());
        assert_eq!(
            b.dedupe_key(),
            DedupeKey::Fallback("a".into(), "b|c".into())
        );
    }

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize_text("  Hello\t\nWORLD  "), "hello world");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn blank_contact_fields_are_absent() {
        let mut c = candidate(Some("a"), "A", "");
        c.phone = Some("   ".into());
        c.website_url = Some(String::new());
        assert_eq!(c.phone_number(), None);
        assert_eq!(c.website(), None);
    }

    #[test]
    fn breakdown_serializes_with_factor_names() {
        let mut breakdown = BTreeMap::new();
        breakdown.insert(ScoreFactor::Website, 3.0);
        breakdown.insert(ScoreFactor::Types, 1.0);
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["website"], 3.0);
        assert_eq!(json["types"], 1.0);
    }

    #[test]
    fn socials_serialize_with_network_keys() {
        let mut socials = BTreeMap::new();
        socials.insert(SocialNetwork::X, "https://x.com/acme".to_string());
        let json = serde_json::to_value(&socials).unwrap();
        assert_eq!(json["x"], "https://x.com/acme");
        assert_eq!(SocialNetwork::Instagram.to_string(), "instagram");
    }
}
