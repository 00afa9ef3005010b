//! Pure search/filter/sort over a classified batch.
//!
//! `apply` never mutates the batch result; it is a reentrant function of
//! (batch, view state) and can be called repeatedly with different views.

use crate::record::{BatchResult, Category, ClassifiedRecord};
use chrono::DateTime;
use std::cmp::Ordering;

/// Category selection for the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Union of all buckets, in order needs_reply, important, ignore.
    #[default]
    All,
    Only(Category),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    Sender,
    Subject,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

/// The current search/filter/sort selection. Passed explicitly so the engine
/// holds no ambient state.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub query: String,
    pub filter: CategoryFilter,
    pub sort: SortKey,
    pub direction: Direction,
}

/// A derived, read-only projection of a batch result.
#[derive(Debug, Clone)]
pub struct BatchView {
    pub records: Vec<ClassifiedRecord>,
    pub matched_count: usize,
    pub total_count: usize,
}

/// Project a batch result through a view state.
#[must_use]
pub fn apply(result: &BatchResult, view: &ViewState) -> BatchView {
    let mut records: Vec<ClassifiedRecord> = match view.filter {
        CategoryFilter::All => result
            .categorized
            .needs_reply
            .iter()
            .chain(result.categorized.important.iter())
            .chain(result.categorized.ignore.iter())
            .cloned()
            .collect(),
        CategoryFilter::Only(category) => result.categorized.bucket(category).to_vec(),
    };

    if !view.query.is_empty() {
        let needle = view.query.to_lowercase();
        records.retain(|r| matches_query(r, &needle));
    }

    // Vec::sort_by is stable: equal keys keep their pre-sort relative order,
    // and reversing the comparator does not disturb ties.
    records.sort_by(|a, b| {
        let ord = compare(a, b, view.sort);
        match view.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    });

    BatchView {
        matched_count: records.len(),
        total_count: result.total,
        records,
    }
}

/// Case-insensitive substring match over subject, sender, preview, and the
/// record's own category name.
fn matches_query(record: &ClassifiedRecord, needle: &str) -> bool {
    record.record.subject.to_lowercase().contains(needle)
        || record.record.sender.to_lowercase().contains(needle)
        || record.record.preview.to_lowercase().contains(needle)
        || record.category.as_str().contains(needle)
}

fn compare(a: &ClassifiedRecord, b: &ClassifiedRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => sort_timestamp(a).cmp(&sort_timestamp(b)),
        SortKey::Sender => fold(&a.record.sender).cmp(&fold(&b.record.sender)),
        SortKey::Subject => fold(&a.record.subject).cmp(&fold(&b.record.subject)),
        SortKey::Priority => a
            .category
            .priority_weight()
            .cmp(&b.category.priority_weight()),
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Unparseable timestamps order as earliest.
fn sort_timestamp(record: &ClassifiedRecord) -> i64 {
    DateTime::parse_from_rfc3339(&record.record.timestamp)
        .map(|t| t.timestamp_millis())
        .unwrap_or(i64::MIN)
}
