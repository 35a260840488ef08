use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::traits::{FetchedPage, PageFetcher};

const USER_AGENT: &str = "LeadFinderBot/0.1 (+social link discovery)";
const MAX_REDIRECTS: usize = 5;
/// Social links live in headers and footers; no need for more.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Fetches business websites over HTTP(S), following redirects.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build website HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let parsed = url::Url::parse(url).with_context(|| format!("invalid website URL: {url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("unsupported scheme '{}' for {url}", parsed.scheme());
        }

        let mut resp = self
            .client
            .get(parsed)
            .send()
            .await
            .with_context(|| format!("website fetch failed: {url}"))?;
        let status = resp.status().as_u16();

        let mut body = Vec::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .with_context(|| format!("failed to read website body: {url}"))?
        {
            let room = MAX_BODY_BYTES - body.len();
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() >= MAX_BODY_BYTES {
                debug!(url, "Website body truncated");
                break;
            }
        }

        debug!(url, status, bytes = body.len(), "Website fetched");
        Ok(FetchedPage {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use places_client::testing::CannedServer;

    #[tokio::test]
    async fn non_http_scheme_is_not_fetched() {
        let fetcher = HttpPageFetcher::new(Duration::from_secs(1)).unwrap();
        assert!(fetcher.fetch("ftp://acme.example/").await.is_err());
        assert!(fetcher.fetch("not a url").await.is_err());
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let fetcher = HttpPageFetcher::new(Duration::from_millis(500)).unwrap();
        assert!(fetcher.fetch("http://127.0.0.1:9/").await.is_err());
    }

    #[tokio::test]
    async fn oversized_body_is_cut_at_the_cap() {
        let oversized = "a".repeat(MAX_BODY_BYTES + 512 * 1024);
        let server = CannedServer::start(vec![(200, oversized)]).await;
        let fetcher = HttpPageFetcher::new(Duration::from_secs(5)).unwrap();

        let page = fetcher.fetch(&format!("{}/", server.url())).await.unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.body.len(), MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn error_status_is_still_a_completed_exchange() {
        let server = CannedServer::start(vec![(404, "missing")]).await;
        let fetcher = HttpPageFetcher::new(Duration::from_secs(5)).unwrap();

        let page = fetcher.fetch(&format!("{}/about", server.url())).await.unwrap();

        assert_eq!(page.status, 404);
        assert_eq!(page.body, "missing");
        assert_eq!(server.paths(), vec!["/about"]);
    }
}
