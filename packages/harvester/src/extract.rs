//! Record extraction from persisted page content.
//!
//! Parses the tender table out of a page's HTML. The first table row is a
//! header and is skipped; within each data row the first cell is a running
//! index and is discarded, then the remaining cells map positionally to
//! title, category, ministry, company, value, and reason.
//!
//! Extraction is a pure function of the persisted content: extracting the
//! same page twice yields the same records.

use scraper::{Html, Selector};
use tracing::warn;

use crate::error::{ExtractError, ExtractResult};
use crate::store::PageStore;
use crate::types::{PageId, Tender};

/// Load a page from the store and extract its tender records.
///
/// Fails with [`ExtractError::Load`] if the persisted content is missing or
/// unreadable, or [`ExtractError::Parse`] if it contains no tender table.
/// A page with a table but no data rows yields an empty vec.
pub async fn extract_tenders<S: PageStore + ?Sized>(
    store: &S,
    page: PageId,
) -> ExtractResult<Vec<Tender>> {
    let content = store
        .load(page)
        .await
        .map_err(|source| ExtractError::Load { page, source })?;

    parse_tenders(page, &content)
}

/// Parse tender records out of raw page HTML.
pub fn parse_tenders(page: PageId, content: &str) -> ExtractResult<Vec<Tender>> {
    let table_selector = Selector::parse("table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();

    let document = Html::parse_document(content);

    let table = document
        .select(&table_selector)
        .next()
        .ok_or(ExtractError::Parse { page })?;

    let mut tenders = Vec::new();

    // First row is the column header
    for row in table.select(&row_selector).skip(1) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .skip(1) // first column is a running index
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        if cells.is_empty() {
            continue;
        }

        let mut tender = Tender::default();
        for (i, text) in cells.into_iter().enumerate() {
            match i {
                0 => tender.title = text,
                1 => tender.category = text,
                2 => tender.ministry = text,
                3 => tender.company = text,
                4 => tender.value = decode_value(page, &text),
                5 => tender.reason = text,
                _ => {}
            }
        }
        tenders.push(tender);
    }

    Ok(tenders)
}

/// Decode a tender amount: thousands separators are stripped and everything
/// before the first decimal point is read as an integer. A malformed amount
/// is logged and left at 0; it never fails the row.
fn decode_value(page: PageId, raw: &str) -> i64 {
    let cleaned = raw.replace(',', "");
    let integral = cleaned.split('.').next().unwrap_or("");

    match integral.parse::<i64>() {
        Ok(value) => value,
        Err(e) => {
            warn!(page = %page, value = %raw, error = %e, "malformed tender value, defaulting to 0");
            0
        }
    }
}
