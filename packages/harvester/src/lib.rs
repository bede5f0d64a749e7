//! Concurrent Tender Listing Harvester
//!
//! Fetches a fixed set of paginated listing pages in parallel, persists each
//! page's raw HTML, extracts tabular tender records, and aggregates them
//! into a single JSON file.
//!
//! # Design
//!
//! The heart of the crate is [`pipeline::run`]: one fetch worker per page
//! fans out over the network, a coordinator collects every worker's outcome
//! and declares "all settled", and a single aggregator drains page ids as
//! they arrive, extracting records with overlap between the fetch and
//! extraction phases. Two single-fire completion signals (fetches settled,
//! aggregation done) are multiplexed by the supervisor; the run finishes
//! only after both have fired.
//!
//! Page-level failures are logged and skipped, never fatal: a run where
//! every page fails still writes an empty output array and exits cleanly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use harvester::{pipeline, FsPageStore, HarvestConfig, HttpFetcher};
//!
//! let config = HarvestConfig::from_env()?;
//! let fetcher = Arc::new(HttpFetcher::new(&config.target_url)?);
//! let store = Arc::new(FsPageStore::new(&config.download_dir));
//! store.ensure_dir().await?;
//!
//! let summary = pipeline::run(&config, fetcher, store).await;
//! println!("collected {} records", summary.records);
//! ```
//!
//! # Modules
//!
//! - [`pipeline`] - The concurrent fetch/aggregate pipeline
//! - [`fetch`] - `PageFetcher` trait and the HTTP implementation
//! - [`store`] - Persisted page content storage
//! - [`extract`] - Record extraction from persisted HTML
//! - [`config`] - Run configuration
//! - [`testing`] - Mock implementations for tests

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod store;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use config::HarvestConfig;
pub use error::{ConfigError, ExtractError, FetchError, OutputError};
pub use extract::{extract_tenders, parse_tenders};
pub use fetch::{HttpFetcher, PageFetcher};
pub use store::{FsPageStore, PageStore};
pub use types::{page_range, HarvestSummary, PageId, Tender};
