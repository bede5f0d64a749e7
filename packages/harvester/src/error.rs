//! Typed errors for the harvest pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Every error here is
//! scoped to a single page or to the final output flush; none of them abort
//! the run. The pipeline logs and absorbs them at the stage where they occur.

use thiserror::Error;

use crate::types::PageId;

/// Errors that can occur while fetching and persisting one page.
///
/// All variants are terminal for that page only: the worker reports the
/// failure to the coordinator and the page is skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request URL could not be constructed
    #[error("invalid request URL: {0}")]
    RequestBuild(#[from] url::ParseError),

    /// HTTP request failed (connect, transfer, or body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP status {status} for page {page}")]
    Status { page: PageId, status: u16 },

    /// Fetched content could not be written to the page store
    #[error("failed to persist page {page}: {source}")]
    Persist {
        page: PageId,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while extracting records from persisted content.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Persisted content is missing or unreadable
    #[error("failed to load page {page}: {source}")]
    Load {
        page: PageId,
        #[source]
        source: std::io::Error,
    },

    /// Content does not contain the expected tender table
    #[error("no tender table found on page {page}")]
    Parse { page: PageId },
}

/// Errors that can occur during the final output flush.
///
/// Logged by the aggregator; never blocks process termination.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Record collection could not be serialized
    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Serialized output could not be written
    #[error("failed to write results: {0}")]
    Write(#[from] std::io::Error),
}

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Page count env var did not parse as an integer
    #[error("invalid page count {value:?}: {source}")]
    InvalidPageCount {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for extraction operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
