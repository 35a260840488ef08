use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use leadfinder_common::{Anchor, AppConfig, LeadFinderError, RawCandidate};
use places_client::{
    LocationBias, PlaceDetails, PlaceSummary, PlacesClient, PlacesConfig, RetryPolicy,
};

use crate::traits::{DiscoveryProvider, SearchPage};

pub const PROVIDER_NAME: &str = "google_places";

/// Discovery over the Google Places API (v1).
///
/// Each search page is followed by one details call per place: phone and
/// website only come back from details, and the lean search mask keeps
/// pages cheap. Places without an id are skipped.
pub struct GooglePlacesProvider {
    client: PlacesClient,
}

impl GooglePlacesProvider {
    pub fn new(client: PlacesClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut places = PlacesConfig::new(config.google_places_api_key.clone());
        places.language_code = config.places_language_code.clone();
        places.region_code = config.places_region_code.clone();
        places.timeout = config.places_timeout;
        places.retry = RetryPolicy {
            max_retries: config.places_max_retries,
            base_backoff: config.places_base_backoff,
            ..RetryPolicy::default()
        };

        let client = PlacesClient::new(places)
            .map_err(|e| LeadFinderError::Config(format!("Places client: {e}")))?;
        info!(
            language = config.places_language_code.as_str(),
            region = ?config.places_region_code,
            "GooglePlacesProvider initialized"
        );
        Ok(Self::new(client))
    }
}

#[async_trait]
impl DiscoveryProvider for GooglePlacesProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn search(
        &self,
        query: &str,
        anchor: &Anchor,
        page_token: Option<&str>,
    ) -> Result<SearchPage> {
        let request = self.client.text_request(
            query,
            Some(LocationBias::circle(
                anchor.center_lat,
                anchor.center_lng,
                anchor.radius_km,
            )),
            page_token,
        );
        let page = self
            .client
            .search_text(&request)
            .await
            .map_err(|e| LeadFinderError::Provider(format!("searchText: {e}")))?;

        let mut candidates = Vec::with_capacity(page.places.len());
        for place in &page.places {
            let Some(place_id) = place.id.as_deref().filter(|id| !id.is_empty()) else {
                debug!("Skipping place without id");
                continue;
            };
            let details = self
                .client
                .place_details(place_id)
                .await
                .map_err(|e| LeadFinderError::Provider(format!("details {place_id}: {e}")))?;
            candidates.push(candidate_from_place(place_id, place, &details));
        }

        debug!(
            query,
            places = page.places.len(),
            candidates = candidates.len(),
            has_next = page.next_page().is_some(),
            "Places page mapped"
        );

        Ok(SearchPage {
            candidates,
            next_page_token: page.next_page().map(String::from),
        })
    }
}

/// Normalize one place. Fields come from details; the search summary is only
/// kept in the payload for provenance.
pub fn candidate_from_place(
    place_id: &str,
    summary: &PlaceSummary,
    details: &PlaceDetails,
) -> RawCandidate {
    let address_full = details.formatted_address.clone().unwrap_or_default();
    let (city, region, country) = split_address(&address_full);

    RawCandidate {
        source: PROVIDER_NAME.to_string(),
        source_id: Some(place_id.to_string()),
        payload: serde_json::json!({
            "search_place": summary,
            "details": details,
        }),
        name: details.name().to_string(),
        city,
        region,
        country,
        lat: details.location.map(|l| l.latitude),
        lng: details.location.map(|l| l.longitude),
        phone: details.national_phone_number.clone(),
        website_url: details.website_uri.clone(),
        categories: details.types.clone(),
        address_full,
    }
}

/// `(city, region, country)` from a formatted address, read right to left
/// over the non-empty comma-separated parts. Approximate: "street, City,
/// Region Postal, Country" is the shape this expects.
pub fn split_address(address: &str) -> (Option<String>, Option<String>, Option<String>) {
    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let from_end = |n: usize| {
        parts
            .len()
            .checked_sub(n)
            .map(|i| parts[i].to_string())
    };
    (from_end(3), from_end(2), from_end(1))
}
