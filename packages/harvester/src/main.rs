// Main entry point for the tender harvester

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use harvester::{pipeline, FsPageStore, HarvestConfig, HttpFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,harvester=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let _ = dotenvy::dotenv();

    let config = HarvestConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        pages = config.page_count,
        target = %config.target_url,
        output = %config.output_path.display(),
        "Starting tender harvest"
    );

    let fetcher =
        Arc::new(HttpFetcher::new(&config.target_url).context("Failed to create HTTP fetcher")?);
    let store = Arc::new(FsPageStore::new(&config.download_dir));
    store
        .ensure_dir()
        .await
        .context("Failed to create download directory")?;

    let summary = pipeline::run(&config, fetcher, store).await;

    tracing::info!(
        pages = summary.pages_processed,
        records = summary.records,
        failed_pages = summary.failed_pages.len(),
        "Harvest complete"
    );

    Ok(())
}
