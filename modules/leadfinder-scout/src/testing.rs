// Test mocks for the lead search pipeline.
//
// Two mocks matching the two network trait boundaries:
// - MockProvider (DiscoveryProvider): pages keyed by page token, call log,
//   failure injection, and an "always another page" mode
// - MockPageFetcher (PageFetcher): HashMap-based URL→status/body or
//   connection failure, call log
//
// Plus CandidateBuilder for constructing RawCandidates.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use leadfinder_common::{Anchor, RawCandidate};

use crate::discovery::google_places::PROVIDER_NAME;
use crate::traits::{DiscoveryProvider, FetchedPage, PageFetcher, SearchPage};

// ---------------------------------------------------------------------------
// Candidate builders
// ---------------------------------------------------------------------------

pub const TEST_ADDRESS: &str = "100 Main St, Vancouver, BC, Canada";

/// A google_places candidate named "Business <id>" with an address and
/// nothing else (scores 1.0).
pub fn candidate(id: &str) -> RawCandidate {
    CandidateBuilder::new(id).build()
}

pub struct CandidateBuilder {
    inner: RawCandidate,
}

impl CandidateBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            inner: RawCandidate {
                source: PROVIDER_NAME.to_string(),
                source_id: Some(id.to_string()),
                payload: serde_json::json!({ "id": id }),
                name: format!("Business {id}"),
                address_full: TEST_ADDRESS.to_string(),
                city: Some("Vancouver".into()),
                region: Some("BC".into()),
                country: Some("Canada".into()),
                lat: None,
                lng: None,
                phone: None,
                website_url: None,
                categories: Vec::new(),
            },
        }
    }

    /// A candidate the provider returned without an id.
    pub fn without_id(name: &str, address: &str) -> Self {
        let mut b = Self::new("");
        b.inner.source_id = None;
        b.inner.name = name.to_string();
        b.inner.address_full = address.to_string();
        b
    }

    pub fn source(mut self, source: &str) -> Self {
        self.inner.source = source.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.inner.name = name.to_string();
        self
    }

    pub fn address(mut self, address: &str) -> Self {
        self.inner.address_full = address.to_string();
        self
    }

    pub fn website(mut self, url: &str) -> Self {
        self.inner.website_url = Some(url.to_string());
        self
    }

    pub fn phone(mut self, phone: &str) -> Self {
        self.inner.phone = Some(phone.to_string());
        self
    }

    pub fn categories(mut self, categories: &[&str]) -> Self {
        self.inner.categories = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn build(self) -> RawCandidate {
        self.inner
    }
}

// ---------------------------------------------------------------------------
// MockProvider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCall {
    pub query: String,
    pub anchor: Anchor,
    pub page_token: Option<String>,
}

/// Scripted discovery provider. Pages are keyed by the page token they answer
/// (`None` for the first page) and served for every anchor. Unscripted tokens
/// get an empty final page.
pub struct MockProvider {
    pages: HashMap<Option<String>, SearchPage>,
    endless_page_size: Option<usize>,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            endless_page_size: None,
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call returns `page_size` fresh candidates and another token.
    pub fn endless(page_size: usize) -> Self {
        Self {
            endless_page_size: Some(page_size),
            ..Self::new()
        }
    }

    pub fn on_page(
        mut self,
        token: Option<&str>,
        candidates: Vec<RawCandidate>,
        next_page_token: Option<&str>,
    ) -> Self {
        self.pages.insert(
            token.map(String::from),
            SearchPage {
                candidates,
                next_page_token: next_page_token.map(String::from),
            },
        );
        self
    }

    /// Fail the call with this 0-based index, as a provider does once its
    /// retries are exhausted.
    pub fn fail_on_call(mut self, index: usize) -> Self {
        self.fail_on_call = Some(index);
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiscoveryProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(
        &self,
        query: &str,
        anchor: &Anchor,
        page_token: Option<&str>,
    ) -> Result<SearchPage> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(ProviderCall {
                query: query.to_string(),
                anchor: *anchor,
                page_token: page_token.map(String::from),
            });
            calls.len() - 1
        };

        if self.fail_on_call == Some(index) {
            bail!("mock provider failure on call {index}");
        }

        if let Some(size) = self.endless_page_size {
            return Ok(SearchPage {
                candidates: (0..size).map(|i| candidate(&format!("p{index}-{i}"))).collect(),
                next_page_token: Some(format!("t{}", index + 1)),
            });
        }

        Ok(self
            .pages
            .get(&page_token.map(String::from))
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockPageFetcher
// ---------------------------------------------------------------------------

enum MockResponse {
    Page(FetchedPage),
    ConnectError,
}

/// HashMap-based website fetcher. Returns `Err` for unregistered URLs.
pub struct MockPageFetcher {
    responses: HashMap<String, MockResponse>,
    calls: Mutex<Vec<String>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            MockResponse::Page(FetchedPage {
                status,
                body: body.to_string(),
            }),
        );
        self
    }

    /// The exchange never completes (DNS/connect/timeout).
    pub fn on_connect_error(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), MockResponse::ConnectError);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(MockResponse::Page(page)) => Ok(page.clone()),
            Some(MockResponse::ConnectError) => bail!("MockPageFetcher: connection refused for {url}"),
            None => bail!("MockPageFetcher: no page registered for {url}"),
        }
    }
}
