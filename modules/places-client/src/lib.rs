pub mod error;
pub mod retry;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{PlacesError, Result};
pub use retry::{with_retries, Classified, Retried, RetryPolicy, TRANSIENT_STATUSES};
pub use types::{
    Circle, LatLng, LocalizedText, LocationBias, PlaceDetails, PlaceSummary, SearchTextRequest,
    SearchTextResponse,
};

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

const BASE_URL: &str = "https://places.googleapis.com/v1";

/// Lean mask for search pages. Phone and website are only available through
/// details, which is what keeps search pages cheap.
pub const SEARCH_FIELD_MASK: &str =
    "places.id,places.displayName.text,places.formattedAddress,places.location,places.types";

pub const DETAILS_FIELD_MASK: &str =
    "id,displayName.text,formattedAddress,location,types,nationalPhoneNumber,websiteUri";

#[derive(Debug, Clone)]
pub struct PlacesConfig {
    pub api_key: String,
    /// e.g. "en" or "en-CA"
    pub language_code: String,
    /// e.g. "CA" to bias results towards Canada
    pub region_code: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub search_field_mask: String,
    pub details_field_mask: String,
    pub base_url: String,
}

impl PlacesConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            language_code: "en".to_string(),
            region_code: Some("CA".to_string()),
            timeout: Duration::from_secs(20),
            retry: RetryPolicy::default(),
            search_field_mask: SEARCH_FIELD_MASK.to_string(),
            details_field_mask: DETAILS_FIELD_MASK.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }
}

pub struct PlacesClient {
    client: reqwest::Client,
    config: PlacesConfig,
}

impl PlacesClient {
    pub fn new(config: PlacesConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(PlacesError::Config("Places API key is required".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlacesError::Config(e.to_string()))?;

        Ok(Self {
            client,
            config: PlacesConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    pub fn config(&self) -> &PlacesConfig {
        &self.config
    }

    /// One page of text search results.
    pub async fn search_text(&self, request: &SearchTextRequest) -> Result<SearchTextResponse> {
        let url = format!("{}/places:searchText", self.config.base_url);
        let body = serde_json::to_value(request)?;
        debug!(query = %request.text_query, page_token = ?request.page_token, "Places searchText");

        self.request_with_retries(
            Method::POST,
            &url,
            &self.config.search_field_mask,
            Some(&body),
        )
        .await
    }

    /// Full details for one place (phone and website live here).
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails> {
        let url = format!("{}/places/{}", self.config.base_url, place_id);
        debug!(place_id, "Places details");

        self.request_with_retries(Method::GET, &url, &self.config.details_field_mask, None)
            .await
    }

    /// A `searchText` request body for this client's language/region settings.
    pub fn text_request(
        &self,
        query: &str,
        location_bias: Option<LocationBias>,
        page_token: Option<&str>,
    ) -> SearchTextRequest {
        SearchTextRequest {
            text_query: query.to_string(),
            language_code: self.config.language_code.clone(),
            location_bias,
            region_code: self
                .config
                .region_code
                .clone()
                .filter(|r| !r.is_empty()),
            page_token: page_token.map(String::from),
        }
    }

    async fn request_with_retries<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        field_mask: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        let retried = with_retries(&self.config.retry, url, |_attempt| {
            let method = method.clone();
            async move { self.attempt(method, url, field_mask, body).await }
        })
        .await?;

        if retried.attempts > 1 {
            debug!(url, attempts = retried.attempts, "Places request succeeded after retries");
        }
        Ok(retried.value)
    }

    /// A single HTTP exchange, classified.
    async fn attempt<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        field_mask: &str,
        body: Option<&serde_json::Value>,
    ) -> std::result::Result<T, Classified> {
        let mut req = self
            .client
            .request(method, url)
            .header("X-Goog-Api-Key", &self.config.api_key)
            .header("X-Goog-FieldMask", field_mask)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(Classified::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Classified::from_status(status.as_u16(), message));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| Classified::Transient(PlacesError::Network(e.to_string())))?;
        parse_object(&text).map_err(Classified::Transient)
    }
}

/// Parse a response body that must be a JSON object. Anything else is
/// treated as a malformed (and therefore retryable) response.
fn parse_object<T: DeserializeOwned>(text: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(PlacesError::Parse("expected JSON object response".into()));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedServer;

    #[test]
    fn empty_api_key_is_rejected() {
        let err = PlacesClient::new(PlacesConfig::new("")).err().unwrap();
        assert!(matches!(err, PlacesError::Config(_)));
    }

    #[test]
    fn text_request_uses_client_settings() {
        let mut config = PlacesConfig::new("key");
        config.language_code = "en-CA".into();
        let client = PlacesClient::new(config).unwrap();

        let req = client.text_request(
            "coffee",
            Some(LocationBias::circle(1.0, 2.0, 3.0)),
            Some("next"),
        );
        assert_eq!(req.language_code, "en-CA");
        assert_eq!(req.region_code.as_deref(), Some("CA"));
        assert_eq!(req.page_token.as_deref(), Some("next"));
        assert_eq!(req.location_bias.unwrap().circle.radius, 3000.0);
    }

    #[test]
    fn empty_region_code_is_dropped() {
        let mut config = PlacesConfig::new("key");
        config.region_code = Some(String::new());
        let client = PlacesClient::new(config).unwrap();
        assert!(client.text_request("q", None, None).region_code.is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let mut config = PlacesConfig::new("key");
        config.base_url = "http://localhost:9999/v1/".into();
        let client = PlacesClient::new(config).unwrap();
        assert_eq!(client.config().base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn non_object_body_is_a_parse_error() {
        let err = parse_object::<SearchTextResponse>("[1, 2]").unwrap_err();
        assert!(matches!(err, PlacesError::Parse(_)));
        let err = parse_object::<SearchTextResponse>("<html>").unwrap_err();
        assert!(matches!(err, PlacesError::Parse(_)));
    }

    #[test]
    fn object_body_parses() {
        let resp: SearchTextResponse =
            parse_object(r#"{"places": [{"id": "a"}], "nextPageToken": "t"}"#).unwrap();
        assert_eq!(resp.places.len(), 1);
        assert_eq!(resp.next_page(), Some("t"));
    }

    fn client_for(server: &CannedServer, max_retries: u32) -> PlacesClient {
        let mut config = PlacesConfig::new("key");
        config.base_url = format!("{}/v1", server.url());
        config.retry = RetryPolicy::immediate(max_retries);
        PlacesClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn malformed_success_and_throttling_are_retried() {
        let server = CannedServer::start(vec![
            (200, "<html>"),
            (429, "slow down"),
            (200, r#"{"id": "a", "websiteUri": "https://w"}"#),
        ])
        .await;
        let client = client_for(&server, 4);

        let details = client.place_details("a").await.unwrap();

        assert_eq!(details.website_uri.as_deref(), Some("https://w"));
        assert_eq!(server.paths(), vec!["/v1/places/a"; 3]);
        assert!(server.requests().iter().all(|r| r.method == "GET"));
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let server = CannedServer::start(vec![(400, "bad"), (200, r#"{"id": "a"}"#)]).await;
        let client = client_for(&server, 4);

        let err = client.place_details("a").await.unwrap_err();

        assert!(matches!(&err, PlacesError::Api { status: 400, message } if message == "bad"));
        assert_eq!(err.to_string(), "API error (status 400): bad");
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn non_object_json_exhausts_retries() {
        let server = CannedServer::start(vec![(200, "[1]"), (200, "[1]"), (200, "{}")]).await;
        let client = client_for(&server, 1);

        let err = client.place_details("a").await.unwrap_err();

        match err {
            PlacesError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, PlacesError::Parse(_)));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn search_text_posts_request_body() {
        let server = CannedServer::start(vec![(
            200,
            r#"{"places": [{"id": "a"}, {"id": "b"}], "nextPageToken": "t2"}"#,
        )])
        .await;
        let client = client_for(&server, 0);
        let request = client.text_request("coffee", None, Some("t1"));

        let page = client.search_text(&request).await.unwrap();

        assert_eq!(page.places.len(), 2);
        assert_eq!(page.next_page(), Some("t2"));
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/v1/places:searchText");
        let sent: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(sent["textQuery"], "coffee");
        assert_eq!(sent["pageToken"], "t1");
    }

    #[tokio::test]
    async fn unreachable_host_exhausts_retries() {
        let mut config = PlacesConfig::new("key");
        // Nothing listens on the local discard port.
        config.base_url = "http://127.0.0.1:9".into();
        config.timeout = Duration::from_millis(500);
        config.retry = RetryPolicy::immediate(1);
        let client = PlacesClient::new(config).unwrap();

        let err = client.place_details("abc").await.unwrap_err();
        assert!(matches!(err, PlacesError::RetriesExhausted { attempts: 2, .. }));
    }
}
