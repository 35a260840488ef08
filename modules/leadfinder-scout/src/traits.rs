// Trait abstractions for the pipeline's external collaborators.
//
// DiscoveryProvider wraps one places-search service (paginated search).
// PageFetcher fetches business websites for social-link enrichment.
// RunStore holds search status records for the orchestrator.
//
// These enable deterministic testing with MockProvider and MockPageFetcher:
// no network, no API keys.

use anyhow::Result;
use async_trait::async_trait;

use leadfinder_common::{Anchor, RawCandidate, SearchStatus};

// ---------------------------------------------------------------------------
// DiscoveryProvider
// ---------------------------------------------------------------------------

/// One page of discovery results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub candidates: Vec<RawCandidate>,
    /// Absent exactly when the provider has no further pages for this anchor.
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    /// Provider identifier, used as `RawCandidate::source`.
    fn name(&self) -> &str;

    /// Fetch one page of candidates around `anchor`. Retries are the
    /// provider's business; an `Err` here is terminal for the run.
    async fn search(
        &self,
        query: &str,
        anchor: &Anchor,
        page_token: Option<&str>,
    ) -> Result<SearchPage>;
}

// ---------------------------------------------------------------------------
// PageFetcher
// ---------------------------------------------------------------------------

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// `Ok` once the server answered (any status). `Err` when the exchange
    /// never completed: DNS, connect, TLS, timeout, body read, bad scheme.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

// ---------------------------------------------------------------------------
// RunStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RunStore: Send + Sync {
    /// Insert or replace the record for `status.search_id`.
    async fn put(&self, status: SearchStatus) -> Result<()>;

    async fn get(&self, search_id: &str) -> Result<Option<SearchStatus>>;
}
