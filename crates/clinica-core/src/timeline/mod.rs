//! Clinical timeline: deterministic filtering and ranking of one
//! patient's records.
//!
//! Pure functions over already-loaded records; this layer never touches
//! the store and never fails. Category scoping happens upstream, by the
//! caller choosing which records to pass in.

mod search;

pub use search::fold_for_search;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use crate::models::{Category, ClinicalRecord, ClinicalStatus, ParseClinicalStatusError};

/// Status clause of the timeline filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Pass every status
    All,
    /// Pass exactly this status
    Only(ClinicalStatus),
}

impl StatusFilter {
    /// Parse a filter label: `"all"` (any casing) or a status label.
    pub fn parse(label: &str) -> Result<Self, ParseClinicalStatusError> {
        if label.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        ClinicalStatus::from_str(label).map(StatusFilter::Only)
    }

    fn passes(&self, status: ClinicalStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == *wanted,
        }
    }
}

/// Build the category-id to display-order index the sort consumes.
pub fn category_order_index(categories: &[Category]) -> HashMap<String, u32> {
    categories
        .iter()
        .map(|c| (c.id.clone(), c.display_order))
        .collect()
}

/// Filter records, then rank them for display.
///
/// Filter: the status clause AND the text clause (folded, substring over
/// title or description; empty search passes everything).
///
/// Rank, ascending and stable: status priority; then date descending with
/// missing dates last; then category display order, where a category
/// absent from `category_orders` sorts last.
pub fn filter_and_sort(
    records: &[ClinicalRecord],
    status_filter: StatusFilter,
    search_text: &str,
    category_orders: &HashMap<String, u32>,
) -> Vec<ClinicalRecord> {
    // Fold the needle once
    let needle = fold_for_search(search_text.trim());

    let mut filtered: Vec<ClinicalRecord> = records
        .iter()
        .filter(|r| status_filter.passes(r.status) && matches_text(r, &needle))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| {
        a.status
            .priority()
            .cmp(&b.status.priority())
            .then_with(|| compare_dates_desc_nulls_last(a, b))
            .then_with(|| order_of(a, category_orders).cmp(&order_of(b, category_orders)))
    });
    filtered
}

fn matches_text(record: &ClinicalRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    fold_for_search(&record.title).contains(needle)
        || record
            .description
            .as_deref()
            .map(|d| fold_for_search(d).contains(needle))
            .unwrap_or(false)
}

fn compare_dates_desc_nulls_last(a: &ClinicalRecord, b: &ClinicalRecord) -> Ordering {
    match (&a.date, &b.date) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn order_of(record: &ClinicalRecord, category_orders: &HashMap<String, u32>) -> u32 {
    category_orders
        .get(&record.category_id)
        .copied()
        .unwrap_or(u32::MAX)
}
