//! Category classification strategies and the batch runner.

use crate::error::{Error, Result};
use crate::keywords::KeywordSets;
use crate::record::{BatchResult, Categorized, Category, ClassifiedRecord, Record};
use async_trait::async_trait;
use std::time::Instant;
use tracing::debug;

/// Category assigned when no keyword set matches. Ambiguous mail is surfaced
/// rather than hidden; a product policy, not a technical requirement.
pub const DEFAULT_CATEGORY: Category = Category::Important;

/// A classification strategy. Selected once at startup; the rule-based and
/// model-backed strategies are interchangeable behind this interface.
#[async_trait]
pub trait Classify: Send + Sync {
    /// Map one record to exactly one category. Must always produce a result.
    async fn classify(&self, record: &Record) -> Category;

    /// Strategy name for logs and the health endpoint.
    fn name(&self) -> &'static str;
}

/// Deterministic keyword-based strategy. Always available; also serves as the
/// fallback for the model-backed strategy.
#[derive(Debug)]
pub struct RuleClassifier {
    // Ordered rule table, evaluated top to bottom; first match wins.
    rules: Vec<(Category, Vec<String>)>,
}

impl RuleClassifier {
    /// Build the rule table from keyword sets. The ignore set is checked
    /// first: bulk senders often carry urgency language ("act now") that must
    /// not route them into `needs_reply`.
    #[must_use]
    pub fn new(keywords: &KeywordSets) -> Self {
        let lower = |terms: &[String]| -> Vec<String> {
            terms.iter().map(|t| t.to_lowercase()).collect()
        };
        Self {
            rules: vec![
                (Category::Ignore, lower(&keywords.ignore)),
                (Category::NeedsReply, lower(&keywords.reply)),
                (Category::Important, lower(&keywords.important)),
            ],
        }
    }

    /// Synchronous single-record decision.
    #[must_use]
    pub fn classify_record(&self, record: &Record) -> Category {
        let text = format!(
            "{} {}",
            record.subject.to_lowercase(),
            record.preview.to_lowercase()
        );
        for (category, terms) in &self.rules {
            if terms.iter().any(|term| text.contains(term.as_str())) {
                debug!("record {} classified as {} by rule table", record.id, category.as_str());
                return *category;
            }
        }
        debug!("record {} has no keyword match, defaulting to {}", record.id, DEFAULT_CATEGORY.as_str());
        DEFAULT_CATEGORY
    }
}

#[async_trait]
impl Classify for RuleClassifier {
    async fn classify(&self, record: &Record) -> Category {
        self.classify_record(record)
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}

/// Classify every record of a validated batch, preserving input order within
/// each category bucket. The recorded duration covers classification only.
pub async fn run_batch(classifier: &dyn Classify, records: &[Record]) -> Result<BatchResult> {
    if records.is_empty() {
        return Err(Error::EmptyBatch);
    }

    let start = Instant::now();
    let mut categorized = Categorized::default();
    for record in records {
        let category = classifier.classify(record).await;
        categorized.push(ClassifiedRecord {
            record: record.clone(),
            category,
        });
    }
    let processing_time = start.elapsed();

    Ok(BatchResult {
        categorized,
        total: records.len(),
        processing_time,
    })
}
