use serde::{Deserialize, Serialize};

// --- searchText request ---

/// Body for `POST /v1/places:searchText`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTextRequest {
    pub text_query: String,
    pub language_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_bias: Option<LocationBias>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationBias {
    pub circle: Circle,
}

impl LocationBias {
    /// Circle bias around a center. `radius_km` is converted to meters, which
    /// is what the API expects.
    pub fn circle(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            circle: Circle {
                center: LatLng {
                    latitude,
                    longitude,
                },
                radius: radius_km * 1000.0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Circle {
    pub center: LatLng,
    /// Meters.
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

// --- Responses ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub text: String,
}

/// One page of `places:searchText` results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTextResponse {
    #[serde(default)]
    pub places: Vec<PlaceSummary>,
    pub next_page_token: Option<String>,
}

impl SearchTextResponse {
    /// The continuation token, with the empty string treated as "no more pages".
    pub fn next_page(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// A place as returned by the lean search field mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSummary {
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// A place as returned by `GET /v1/places/{id}` with the details field mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_uri: Option<String>,
}

impl PlaceDetails {
    pub fn name(&self) -> &str {
        self.display_name
            .as_ref()
            .map(|n| n.text.as_str())
            .unwrap_or_default()
    }
}
