//! Harvest run configuration.
//!
//! Every knob the pipeline consumes lives here: page count, target URL,
//! download directory, and output path. The binary loads it from the
//! environment; tests build it with the `with_*` methods.

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default number of listing pages to fetch.
pub const DEFAULT_PAGE_COUNT: u32 = 15;

/// Default listing endpoint, paged via a `page` query parameter.
pub const DEFAULT_TARGET_URL: &str =
    "http://myprocurement.treasury.gov.my/templates/theme427/rttender.php";

/// Configuration for one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Number of pages to fetch (workers spawned = this value)
    pub page_count: u32,

    /// Base URL of the paginated listing
    pub target_url: String,

    /// Directory where raw page content is persisted
    pub download_dir: PathBuf,

    /// Path of the aggregated JSON output, overwritten each run
    pub output_path: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            page_count: DEFAULT_PAGE_COUNT,
            target_url: DEFAULT_TARGET_URL.to_string(),
            download_dir: PathBuf::from("downloads"),
            output_path: PathBuf::from("results.json"),
        }
    }
}

impl HarvestConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables: `HARVEST_PAGE_COUNT`, `HARVEST_TARGET_URL`,
    /// `HARVEST_DOWNLOAD_DIR`, `HARVEST_OUTPUT_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = env::var("HARVEST_PAGE_COUNT") {
            config.page_count =
                value
                    .parse()
                    .map_err(|source| ConfigError::InvalidPageCount { value, source })?;
        }
        if let Ok(url) = env::var("HARVEST_TARGET_URL") {
            config.target_url = url;
        }
        if let Ok(dir) = env::var("HARVEST_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }
        if let Ok(path) = env::var("HARVEST_OUTPUT_PATH") {
            config.output_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Set the page count.
    pub fn with_page_count(mut self, count: u32) -> Self {
        self.page_count = count;
        self
    }

    /// Set the target URL.
    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = url.into();
        self
    }

    /// Set the download directory.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Set the output path.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }
}
