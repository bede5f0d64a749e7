//! The concurrent harvest pipeline: fetch fan-out, aggregation fan-in,
//! and the two-stage completion protocol.
//!
//! # Architecture
//!
//! ```text
//! run (supervisor)
//!     │
//!     ├─► coordinator ──► spawns one fetch worker per page
//!     │        │              │ fetch ─► persist ─► outcome (oneshot)
//!     │        │              └────────────────────► PageId (shared mpsc)
//!     │        └─► collects outcomes in launch order, fires "all settled"
//!     │
//!     ├─► aggregator ──► drains PageId channel, extracts records,
//!     │                  writes output on close, fires "done"
//!     │
//!     └─► select! over both signals; closes the aggregator input
//!         when "all settled" fires, returns when both observed
//! ```
//!
//! The outcome channel and the PageId channel are deliberately separate:
//! the coordinator only needs to know that every worker finished, while the
//! aggregator starts consuming pages as soon as the first one is persisted.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::config::HarvestConfig;
use crate::error::{FetchError, FetchResult, OutputError};
use crate::extract::extract_tenders;
use crate::fetch::PageFetcher;
use crate::store::PageStore;
use crate::types::{page_range, HarvestSummary, PageId, Tender};

/// Run a full harvest: fetch every configured page, aggregate the extracted
/// records, and write them to the configured output path.
///
/// Page failures (fetch or extraction) are logged and skipped; the run
/// always completes and always writes the output file, possibly as an empty
/// array. Records appear in the order pages finished processing, which is
/// not deterministic across runs.
pub async fn run(
    config: &HarvestConfig,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn PageStore>,
) -> HarvestSummary {
    let capacity = config.page_count.max(1) as usize;
    let (pages_tx, pages_rx) = mpsc::channel(capacity);
    let (settled_tx, mut settled_rx) = oneshot::channel();
    let (done_tx, mut done_rx) = oneshot::channel();

    tokio::spawn(run_coordinator(
        config.page_count,
        fetcher,
        store.clone(),
        pages_tx.clone(),
        settled_tx,
    ));
    tokio::spawn(run_aggregator(
        pages_rx,
        store,
        config.output_path.clone(),
        done_tx,
    ));

    // Holding this sender keeps the aggregator input open until the
    // coordinator has seen every worker settle.
    let mut input_guard = Some(pages_tx);
    let mut all_settled = false;
    let mut summary: Option<HarvestSummary> = None;

    // Both signals fire exactly once, in either order.
    while !(all_settled && summary.is_some()) {
        tokio::select! {
            outcome = &mut settled_rx, if !all_settled => {
                all_settled = true;
                input_guard.take();
                if outcome.is_err() {
                    error!("fetch coordinator exited without signalling");
                }
                info!("all pages downloaded, aggregation draining");
            }
            outcome = &mut done_rx, if summary.is_none() => {
                match outcome {
                    Ok(s) => {
                        info!(records = s.records, "aggregation finished");
                        summary = Some(s);
                    }
                    Err(_) => {
                        error!("aggregator exited without signalling");
                        summary = Some(HarvestSummary::new());
                    }
                }
            }
        }
    }

    summary.unwrap_or_default()
}

/// Spawn one fetch worker per page, then collect every worker's outcome in
/// launch order and fire the "all settled" signal.
///
/// Outcome reporting is buffered (oneshot), so collecting sequentially never
/// stalls fetch progress; it only sequences when "all settled" is declared.
async fn run_coordinator(
    page_count: u32,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn PageStore>,
    pages_tx: mpsc::Sender<PageId>,
    settled_tx: oneshot::Sender<()>,
) {
    let mut outcomes = Vec::with_capacity(page_count as usize);

    for page in page_range(page_count) {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        tokio::spawn(fetch_worker(
            fetcher.clone(),
            store.clone(),
            page,
            outcome_tx,
            pages_tx.clone(),
        ));
        outcomes.push((page, outcome_rx));
    }
    drop(pages_tx);

    let mut fetched = 0usize;
    let mut failed = 0usize;
    for (page, outcome_rx) in outcomes {
        match outcome_rx.await {
            Ok(Ok(())) => {
                fetched += 1;
                debug!(page = %page, "page settled");
            }
            Ok(Err(e)) => {
                failed += 1;
                warn!(page = %page, error = %e, "page fetch failed");
            }
            Err(_) => {
                failed += 1;
                warn!(page = %page, "fetch worker exited without reporting");
            }
        }
    }

    info!(fetched, failed, "all fetches settled");
    let _ = settled_tx.send(());
}

/// Fetch one page, persist it, report the outcome to the coordinator, and
/// on success offer the page to the aggregator.
///
/// The outcome is reported before the page is offered downstream, so a page
/// is never visible to the aggregator until its content is persisted.
async fn fetch_worker(
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn PageStore>,
    page: PageId,
    outcome_tx: oneshot::Sender<FetchResult<()>>,
    pages_tx: mpsc::Sender<PageId>,
) {
    let outcome = fetch_and_persist(fetcher.as_ref(), store.as_ref(), page).await;
    let succeeded = outcome.is_ok();
    let _ = outcome_tx.send(outcome);

    if succeeded && pages_tx.send(page).await.is_err() {
        warn!(page = %page, "aggregator input closed before page could be queued");
    }
}

async fn fetch_and_persist(
    fetcher: &dyn PageFetcher,
    store: &dyn PageStore,
    page: PageId,
) -> FetchResult<()> {
    let content = fetcher.fetch(page).await?;
    store
        .save(page, &content)
        .await
        .map_err(|source| FetchError::Persist { page, source })?;
    debug!(page = %page, bytes = content.len(), "page persisted");
    Ok(())
}

/// Drain the PageId channel, extracting and accumulating records until the
/// input closes, then write the aggregated output and fire "done".
///
/// Extraction failures skip the page; a failed output write is logged but
/// never suppresses the done signal.
async fn run_aggregator(
    mut pages_rx: mpsc::Receiver<PageId>,
    store: Arc<dyn PageStore>,
    output_path: PathBuf,
    done_tx: oneshot::Sender<HarvestSummary>,
) {
    let mut tenders: Vec<Tender> = Vec::new();
    let mut summary = HarvestSummary::new();

    while let Some(page) = pages_rx.recv().await {
        match extract_tenders(store.as_ref(), page).await {
            Ok(records) => {
                summary.pages_processed += 1;
                debug!(page = %page, records = records.len(), "page extracted");
                tenders.extend(records);
            }
            Err(e) => {
                summary.failed_pages.push(page);
                warn!(page = %page, error = %e, "extraction failed, page skipped");
            }
        }
    }

    summary.records = tenders.len();
    if let Err(e) = write_output(&output_path, &tenders).await {
        error!(path = %output_path.display(), error = %e, "failed to write aggregated output");
    }

    let _ = done_tx.send(summary);
}

async fn write_output(path: &Path, tenders: &[Tender]) -> Result<(), OutputError> {
    let json = serde_json::to_vec(tenders)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tender_page_html, MemoryPageStore, MockFetcher};
    use tokio::sync::Notify;

    fn one_row_page(title: &str) -> String {
        tender_page_html(&[(title, "Works", "MOF", "Acme", "100", "Lowest bid")])
    }

    #[tokio::test]
    async fn test_input_closes_only_after_all_workers_settle() {
        let gate = Arc::new(Notify::new());
        let fetcher: Arc<dyn PageFetcher> = Arc::new(
            MockFetcher::new()
                .with_page(1, one_row_page("a"))
                .with_page(2, one_row_page("b"))
                .with_gated_page(3, one_row_page("c"), gate.clone()),
        );
        let store: Arc<dyn PageStore> = Arc::new(MemoryPageStore::new());

        let (pages_tx, mut pages_rx) = mpsc::channel(3);
        let (settled_tx, mut settled_rx) = oneshot::channel();
        tokio::spawn(run_coordinator(3, fetcher, store, pages_tx, settled_tx));

        // Pages 1 and 2 flow through while page 3 is held at the gate.
        let first = pages_rx.recv().await.unwrap();
        let second = pages_rx.recv().await.unwrap();
        assert_ne!(first, second);
        assert_ne!(first, PageId::new(3));
        assert_ne!(second, PageId::new(3));

        // With a worker still outstanding the input must stay open and
        // "all settled" must not have fired.
        assert!(matches!(
            pages_rx.try_recv(),
            Err(mpsc::error::TryRecvError::Empty)
        ));
        assert!(settled_rx.try_recv().is_err());

        gate.notify_one();
        assert_eq!(pages_rx.recv().await, Some(PageId::new(3)));
        settled_rx.await.unwrap();
        assert_eq!(pages_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_failed_page_never_offered_downstream() {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(
            MockFetcher::new()
                .with_page(1, one_row_page("a"))
                .with_failure(2, "connection refused")
                .with_page(3, one_row_page("c")),
        );
        let store: Arc<dyn PageStore> = Arc::new(MemoryPageStore::new());

        let (pages_tx, mut pages_rx) = mpsc::channel(3);
        let (settled_tx, settled_rx) = oneshot::channel();
        tokio::spawn(run_coordinator(3, fetcher, store, pages_tx, settled_tx));

        settled_rx.await.unwrap();

        let mut offered = Vec::new();
        while let Some(page) = pages_rx.recv().await {
            offered.push(page);
        }
        offered.sort();
        assert_eq!(offered, vec![PageId::new(1), PageId::new(3)]);
    }

    #[tokio::test]
    async fn test_zero_pages_settles_immediately() {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(MockFetcher::new());
        let store: Arc<dyn PageStore> = Arc::new(MemoryPageStore::new());

        let (pages_tx, mut pages_rx) = mpsc::channel(1);
        let (settled_tx, settled_rx) = oneshot::channel();
        tokio::spawn(run_coordinator(0, fetcher, store, pages_tx, settled_tx));

        settled_rx.await.unwrap();
        assert_eq!(pages_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_aggregator_skips_unextractable_pages() {
        let store = Arc::new(MemoryPageStore::new());
        store.save(PageId::new(1), &one_row_page("a")).await.unwrap();
        store
            .save(PageId::new(2), "<html>no table here</html>")
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("results.json");

        let (pages_tx, pages_rx) = mpsc::channel(2);
        let (done_tx, done_rx) = oneshot::channel();
        let store_dyn: Arc<dyn PageStore> = store;
        tokio::spawn(run_aggregator(
            pages_rx,
            store_dyn,
            output.clone(),
            done_tx,
        ));

        pages_tx.send(PageId::new(1)).await.unwrap();
        pages_tx.send(PageId::new(2)).await.unwrap();
        drop(pages_tx);

        let summary = done_rx.await.unwrap();
        assert_eq!(summary.pages_processed, 1);
        assert_eq!(summary.records, 1);
        assert_eq!(summary.failed_pages, vec![PageId::new(2)]);

        let written: Vec<Tender> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].title, "a");
    }

    #[tokio::test]
    async fn test_done_fires_even_when_output_write_fails() {
        let store: Arc<dyn PageStore> = Arc::new(MemoryPageStore::new());

        let dir = tempfile::tempdir().unwrap();
        // Output path points into a directory that does not exist.
        let output = dir.path().join("missing").join("results.json");

        let (pages_tx, pages_rx) = mpsc::channel(1);
        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(run_aggregator(pages_rx, store, output, done_tx));
        drop(pages_tx);

        let summary = done_rx.await.unwrap();
        assert_eq!(summary.records, 0);
    }
}
