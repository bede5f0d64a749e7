//! Persisted page content storage.
//!
//! Each fetched page is written to its own slot keyed by page number, so
//! concurrent workers never contend on the same file. The aggregator reads
//! the same slots back during extraction.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::PageId;

/// Storage for raw page content, one slot per page.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Persist a page's raw content, replacing any previous content.
    async fn save(&self, page: PageId, content: &str) -> io::Result<()>;

    /// Load a page's persisted content.
    async fn load(&self, page: PageId) -> io::Result<String>;
}

/// Filesystem-backed page store writing `<root>/<n>.html`.
pub struct FsPageStore {
    root: PathBuf,
}

impl FsPageStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the storage directory if it does not exist.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// The slot path for a page.
    fn path_for(&self, page: PageId) -> PathBuf {
        self.root.join(format!("{}.html", page))
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl PageStore for FsPageStore {
    async fn save(&self, page: PageId, content: &str) -> io::Result<()> {
        tokio::fs::write(self.path_for(page), content).await
    }

    async fn load(&self, page: PageId) -> io::Result<String> {
        tokio::fs::read_to_string(self.path_for(page)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::new(dir.path());

        store.save(PageId::new(7), "<html>page 7</html>").await.unwrap();
        let content = store.load(PageId::new(7)).await.unwrap();
        assert_eq!(content, "<html>page 7</html>");
    }

    #[tokio::test]
    async fn test_slot_named_by_page_number() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::new(dir.path());

        store.save(PageId::new(3), "content").await.unwrap();
        assert!(dir.path().join("3.html").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::new(dir.path());

        store.save(PageId::new(1), "first").await.unwrap();
        store.save(PageId::new(1), "second").await.unwrap();
        assert_eq!(store.load(PageId::new(1)).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_load_missing_page_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::new(dir.path());

        assert!(store.load(PageId::new(99)).await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("downloads");
        let store = FsPageStore::new(&root);

        store.ensure_dir().await.unwrap();
        assert!(root.is_dir());
    }
}
