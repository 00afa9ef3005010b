//! Message record types and input validation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Maximum subject length kept after validation.
pub const MAX_SUBJECT_LEN: usize = 500;
/// Maximum sender length kept after validation.
pub const MAX_SENDER_LEN: usize = 200;
/// Maximum preview length kept after validation.
pub const MAX_PREVIEW_LEN: usize = 1000;

/// Classification outcome for one record. Mutually exclusive and exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    NeedsReply,
    Important,
    Ignore,
}

impl Category {
    /// Wire name, as used in API payloads and search matching.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NeedsReply => "needs_reply",
            Self::Important => "important",
            Self::Ignore => "ignore",
        }
    }

    /// Fixed weight used by the priority sort.
    #[must_use]
    pub const fn priority_weight(self) -> u8 {
        match self {
            Self::NeedsReply => 3,
            Self::Important => 2,
            Self::Ignore => 1,
        }
    }
}

/// One inbound message summary. All fields default on deserialization so a
/// malformed record reaches the validator instead of failing the batch parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub preview: String,
    pub timestamp: String,
}

/// A record plus its computed category. The category is assigned once at
/// classification time and never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: Record,
    pub category: Category,
}

/// Category buckets in original batch order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Categorized {
    pub needs_reply: Vec<ClassifiedRecord>,
    pub important: Vec<ClassifiedRecord>,
    pub ignore: Vec<ClassifiedRecord>,
}

impl Categorized {
    /// Append a classified record to its bucket, preserving insertion order.
    pub fn push(&mut self, record: ClassifiedRecord) {
        match record.category {
            Category::NeedsReply => self.needs_reply.push(record),
            Category::Important => self.important.push(record),
            Category::Ignore => self.ignore.push(record),
        }
    }

    /// The bucket for one category.
    #[must_use]
    pub fn bucket(&self, category: Category) -> &[ClassifiedRecord] {
        match category {
            Category::NeedsReply => &self.needs_reply,
            Category::Important => &self.important,
            Category::Ignore => &self.ignore,
        }
    }
}

/// Outcome of one classification run. Superseded, never merged, by the next run.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub categorized: Categorized,
    pub total: usize,
    pub processing_time: Duration,
}

/// Validate and normalize a raw batch.
///
/// A record is kept iff its `id` is non-empty and its subject is non-blank
/// after trimming. A duplicate of an `id` already seen in the batch is dropped
/// (first occurrence wins). Rejected records are not reported individually;
/// only the surviving count matters downstream.
#[must_use]
pub fn sanitize_batch(raw: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    let mut valid = Vec::with_capacity(raw.len());

    for mut record in raw {
        if record.id.is_empty() {
            debug!("dropping record with empty id");
            continue;
        }
        let subject = record.subject.trim();
        if subject.is_empty() {
            debug!("dropping record {}: blank subject", record.id);
            continue;
        }
        if !seen.insert(record.id.clone()) {
            debug!("dropping record {}: duplicate id", record.id);
            continue;
        }

        record.subject = truncate_chars(subject, MAX_SUBJECT_LEN);
        record.sender = truncate_chars(record.sender.trim(), MAX_SENDER_LEN);
        record.preview = truncate_chars(&record.preview, MAX_PREVIEW_LEN);
        valid.push(record);
    }

    valid
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, subject: &str) -> Record {
        Record {
            id: id.to_string(),
            subject: subject.to_string(),
            sender: "someone@example.com".to_string(),
            preview: String::new(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn drops_empty_id_and_blank_subject() {
        let batch = vec![raw("", "hello"), raw("1", "   "), raw("2", " kept ")];
        let valid = sanitize_batch(batch);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].id, "2");
        assert_eq!(valid[0].subject, "kept");
    }

    #[test]
    fn drops_duplicate_ids_keeping_first() {
        let batch = vec![raw("1", "first"), raw("1", "second"), raw("2", "other")];
        let valid = sanitize_batch(batch);
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].subject, "first");
    }

    #[test]
    fn truncates_long_fields() {
        let mut record = raw("1", &"s".repeat(600));
        record.preview = "p".repeat(1500);
        let valid = sanitize_batch(vec![record]);
        assert_eq!(valid[0].subject.chars().count(), MAX_SUBJECT_LEN);
        assert_eq!(valid[0].preview.chars().count(), MAX_PREVIEW_LEN);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "é".repeat(MAX_SUBJECT_LEN + 10);
        assert_eq!(truncate_chars(&s, MAX_SUBJECT_LEN).chars().count(), MAX_SUBJECT_LEN);
    }

    #[test]
    fn bucket_selects_by_category() {
        let mut categorized = Categorized::default();
        categorized.push(ClassifiedRecord {
            record: raw("1", "a"),
            category: Category::Ignore,
        });
        assert_eq!(categorized.bucket(Category::Ignore).len(), 1);
        assert!(categorized.bucket(Category::NeedsReply).is_empty());
    }
}
