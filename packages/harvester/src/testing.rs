//! Testing utilities including mock implementations.
//!
//! These are useful for exercising the pipeline without making real network
//! calls or touching the filesystem.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, RwLock};
use tokio::sync::Notify;

use crate::error::{FetchError, FetchResult};
use crate::fetch::PageFetcher;
use crate::store::PageStore;
use crate::types::PageId;

enum Scripted {
    Body(String),
    Failure(String),
    Gated { gate: Arc<Notify>, body: String },
}

/// A mock fetcher serving scripted responses per page.
///
/// Pages can be scripted to succeed, fail, or block until a gate is
/// released, which lets tests control completion order deterministically.
#[derive(Default)]
pub struct MockFetcher {
    responses: RwLock<HashMap<u32, Scripted>>,
    calls: RwLock<Vec<PageId>>,
}

impl MockFetcher {
    /// Create a mock with no scripted pages. Unscripted pages fail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response for a page.
    pub fn with_page(self, page: u32, body: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(page, Scripted::Body(body.into()));
        self
    }

    /// Script a fetch failure for a page.
    pub fn with_failure(self, page: u32, message: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(page, Scripted::Failure(message.into()));
        self
    }

    /// Script a response that is withheld until `gate` is notified.
    pub fn with_gated_page(self, page: u32, body: impl Into<String>, gate: Arc<Notify>) -> Self {
        self.responses.write().unwrap().insert(
            page,
            Scripted::Gated {
                gate,
                body: body.into(),
            },
        );
        self
    }

    /// Pages fetched so far, in call order.
    pub fn calls(&self) -> Vec<PageId> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, page: PageId) -> FetchResult<String> {
        self.calls.write().unwrap().push(page);

        // Clone the script out so the lock is not held across an await.
        let scripted = {
            let responses = self.responses.read().unwrap();
            match responses.get(&page.as_u32()) {
                Some(Scripted::Body(body)) => Scripted::Body(body.clone()),
                Some(Scripted::Failure(message)) => Scripted::Failure(message.clone()),
                Some(Scripted::Gated { gate, body }) => Scripted::Gated {
                    gate: gate.clone(),
                    body: body.clone(),
                },
                None => Scripted::Failure(format!("no scripted response for page {}", page)),
            }
        };

        match scripted {
            Scripted::Body(body) => Ok(body),
            Scripted::Failure(message) => Err(FetchError::Http(message.into())),
            Scripted::Gated { gate, body } => {
                gate.notified().await;
                Ok(body)
            }
        }
    }
}

/// In-memory page store for tests.
#[derive(Default)]
pub struct MemoryPageStore {
    pages: RwLock<HashMap<u32, String>>,
}

impl MemoryPageStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted pages.
    pub fn page_count(&self) -> usize {
        self.pages.read().unwrap().len()
    }
}

#[async_trait]
impl PageStore for MemoryPageStore {
    async fn save(&self, page: PageId, content: &str) -> io::Result<()> {
        self.pages
            .write()
            .unwrap()
            .insert(page.as_u32(), content.to_string());
        Ok(())
    }

    async fn load(&self, page: PageId) -> io::Result<String> {
        self.pages
            .read()
            .unwrap()
            .get(&page.as_u32())
            .cloned()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("page {} not persisted", page))
            })
    }
}

/// Build a listing page with a header row and one data row per entry.
///
/// Each entry is `(title, category, ministry, company, value, reason)`; the
/// first table column is the running index the extractor discards.
pub fn tender_page_html(rows: &[(&str, &str, &str, &str, &str, &str)]) -> String {
    let mut html = String::from(
        "<html><body><table>\n\
         <tr><th>#</th><th>Title</th><th>Category</th><th>Ministry</th>\
         <th>Company</th><th>Value</th><th>Reason</th></tr>\n",
    );
    for (i, (title, category, ministry, company, value, reason)) in rows.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            i + 1,
            title,
            category,
            ministry,
            company,
            value,
            reason
        ));
    }
    html.push_str("</table></body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fetcher_serves_scripted_body() {
        let fetcher = MockFetcher::new().with_page(1, "<html></html>");
        assert_eq!(
            fetcher.fetch(PageId::new(1)).await.unwrap(),
            "<html></html>"
        );
        assert_eq!(fetcher.calls(), vec![PageId::new(1)]);
    }

    #[tokio::test]
    async fn test_mock_fetcher_fails_unscripted_pages() {
        let fetcher = MockFetcher::new();
        assert!(fetcher.fetch(PageId::new(9)).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryPageStore::new();
        store.save(PageId::new(1), "content").await.unwrap();
        assert_eq!(store.load(PageId::new(1)).await.unwrap(), "content");
        assert_eq!(store.page_count(), 1);
        assert!(store.load(PageId::new(2)).await.is_err());
    }

    #[test]
    fn test_tender_page_html_parses_back() {
        let html = tender_page_html(&[("t", "c", "m", "co", "42", "r")]);
        let tenders = crate::extract::parse_tenders(PageId::new(1), &html).unwrap();
        assert_eq!(tenders.len(), 1);
        assert_eq!(tenders[0].value, 42);
    }
}
