//! Page fetching over HTTP.
//!
//! `PageFetcher` is the seam the pipeline uses to retrieve raw page content;
//! `HttpFetcher` is the production implementation. Tests substitute
//! [`crate::testing::MockFetcher`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::types::PageId;

/// Fetches the raw content of one listing page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieve the full body for a page.
    async fn fetch(&self, page: PageId) -> FetchResult<String>;
}

/// HTTP fetcher issuing one GET per page with a `page` query parameter.
pub struct HttpFetcher {
    client: reqwest::Client,
    target: Url,
}

impl HttpFetcher {
    /// Create a fetcher for the given listing URL.
    ///
    /// The client carries a 30s timeout so a stuck page cannot stall the
    /// run indefinitely.
    pub fn new(target: &str) -> FetchResult<Self> {
        let target = Url::parse(target)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("TenderHarvester/1.0")
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self { client, target })
    }

    /// Use a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The request URL for a page.
    fn page_url(&self, page: PageId) -> Url {
        let mut url = self.target.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.as_u32().to_string());
        url
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, page: PageId) -> FetchResult<String> {
        let url = self.page_url(page);
        debug!(page = %page, url = %url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))
    }
}
