//! Core data types for the harvest pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one page of the remote listing, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(u32);

impl PageId {
    /// Create a page id. Pages are numbered from 1.
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    /// The raw page number.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Enumerate the page ids for a run: `1..=count`.
pub fn page_range(count: u32) -> impl Iterator<Item = PageId> {
    (1..=count).map(PageId::new)
}

/// One tender listing extracted from a page's table.
///
/// Field names match the serialized output format exactly. `value` holds
/// the integral part of the tender amount; a malformed amount is recorded
/// as 0 (logged at extraction time, not an error).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tender {
    pub title: String,
    pub category: String,
    pub ministry: String,
    pub company: String,
    pub value: i64,
    pub reason: String,
}

/// Result of a harvest run, filled in by the aggregation stage.
#[derive(Debug, Clone, Default)]
pub struct HarvestSummary {
    /// Pages whose content reached the aggregator and was extracted
    pub pages_processed: usize,

    /// Total records collected across all pages
    pub records: usize,

    /// Pages whose persisted content could not be extracted
    pub failed_pages: Vec<PageId>,
}

impl HarvestSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if every received page was extracted successfully.
    pub fn is_success(&self) -> bool {
        self.failed_pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_range_starts_at_one() {
        let pages: Vec<_> = page_range(3).collect();
        assert_eq!(pages, vec![PageId::new(1), PageId::new(2), PageId::new(3)]);
    }

    #[test]
    fn test_page_range_empty() {
        assert_eq!(page_range(0).count(), 0);
    }

    #[test]
    fn test_tender_serialized_field_names() {
        let tender = Tender {
            title: "Supply of equipment".to_string(),
            category: "Works".to_string(),
            ministry: "Ministry of Finance".to_string(),
            company: "Acme Sdn Bhd".to_string(),
            value: 1234567,
            reason: "Lowest bid".to_string(),
        };

        let json = serde_json::to_value(&tender).unwrap();
        assert_eq!(json["title"], "Supply of equipment");
        assert_eq!(json["ministry"], "Ministry of Finance");
        assert_eq!(json["value"], 1234567);
        assert_eq!(json["reason"], "Lowest bid");
    }
}
