//! Aggregate insight rules over a classified batch.
//!
//! `generate` is a deterministic, side-effect-free function of its input.
//! Rules form an ordered table; each is evaluated independently, then the
//! collected insights are stably ordered by severity.

use crate::keywords::KeywordSets;
use crate::record::{BatchResult, ClassifiedRecord};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::time::Duration;

/// Batches classified faster than this earn the fast-processing insight.
pub const FAST_PROCESSING_THRESHOLD: Duration = Duration::from_millis(100);

/// Insights kept after severity ordering.
const MAX_INSIGHTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    const fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Fixed enumeration of insight rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    ReplyBacklog,
    LowPriorityDominance,
    TopicDetected,
    SenderConcentration,
    AllClear,
    FastProcessing,
}

/// A derived, human-readable observation about one batch. Stateless;
/// recomputed from the batch result each time.
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Evaluate the insight rule table over a batch result.
#[must_use]
pub fn generate(result: &BatchResult, keywords: &KeywordSets) -> Vec<Insight> {
    let mut insights = Vec::new();

    let needs_reply = result.categorized.needs_reply.len();
    let ignore = result.categorized.ignore.len();
    let total = result.total;

    // Reply backlog: the two thresholds are mutually exclusive.
    if needs_reply > 10 {
        insights.push(Insight {
            kind: InsightKind::ReplyBacklog,
            severity: Severity::High,
            title: "High priority messages".to_string(),
            message: format!(
                "You have {needs_reply} messages requiring your attention. Address the urgent ones first."
            ),
            action: Some("Review messages with deadlines first".to_string()),
        });
    } else if needs_reply > 5 {
        insights.push(Insight {
            kind: InsightKind::ReplyBacklog,
            severity: Severity::Medium,
            title: "Action items pending".to_string(),
            message: format!("You have {needs_reply} messages that need a reply."),
            action: Some("Set aside time to respond".to_string()),
        });
    }

    // Low-priority dominance.
    if total > 0 {
        let share = ignore as f64 / total as f64;
        if share > 0.60 && ignore > 20 {
            let percent = (share * 100.0).round() as u32;
            insights.push(Insight {
                kind: InsightKind::LowPriorityDominance,
                severity: Severity::Low,
                title: "Mostly low-priority mail".to_string(),
                message: format!("{percent}% of this batch is low-priority."),
                action: Some("Consider unsubscribing from recurring senders".to_string()),
            });
        }
    }

    // Topic detection over the attention buckets.
    let topic_matches = attention_records(result)
        .filter(|r| {
            let text = format!(
                "{} {}",
                r.record.subject.to_lowercase(),
                r.record.preview.to_lowercase()
            );
            keywords.topics.iter().any(|t| text.contains(t.as_str()))
        })
        .count();
    if topic_matches > 0 {
        insights.push(Insight {
            kind: InsightKind::TopicDetected,
            severity: Severity::High,
            title: "Deadlines detected".to_string(),
            message: format!(
                "{topic_matches} message(s) mention assignments or deadlines."
            ),
            action: Some("Check deadline-related messages immediately".to_string()),
        });
    }

    // Sender concentration over the attention buckets.
    if let Some((domain, count)) = top_sender_domain(result) {
        if count > 5 {
            insights.push(Insight {
                kind: InsightKind::SenderConcentration,
                severity: Severity::Low,
                title: "Primary communication source".to_string(),
                message: format!(
                    "Most of your important messages ({count}) come from {domain}."
                ),
                action: None,
            });
        }
    }

    // All-clear.
    if needs_reply == 0 && total > 10 {
        insights.push(Insight {
            kind: InsightKind::AllClear,
            severity: Severity::Low,
            title: "All caught up".to_string(),
            message: "No messages require a reply right now.".to_string(),
            action: None,
        });
    }

    // Fast processing.
    if result.processing_time < FAST_PROCESSING_THRESHOLD {
        let ms = result.processing_time.as_secs_f64() * 1000.0;
        insights.push(Insight {
            kind: InsightKind::FastProcessing,
            severity: Severity::Low,
            title: "Fast processing".to_string(),
            message: format!("Batch classified in {ms:.2} ms."),
            action: None,
        });
    }

    // Stable: equal severities keep rule-table order.
    insights.sort_by_key(|i| Reverse(i.severity.rank()));
    insights.truncate(MAX_INSIGHTS);
    insights
}

fn attention_records(result: &BatchResult) -> impl Iterator<Item = &ClassifiedRecord> {
    result
        .categorized
        .needs_reply
        .iter()
        .chain(result.categorized.important.iter())
}

/// Group attention records by the text after the last `@` of the sender.
/// Ties break toward the lexicographically smaller domain so the outcome is
/// deterministic.
fn top_sender_domain(result: &BatchResult) -> Option<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in attention_records(result) {
        if let Some((_, domain)) = record.record.sender.rsplit_once('@') {
            if !domain.is_empty() {
                *counts.entry(domain).or_insert(0) += 1;
            }
        }
    }
    counts
        .into_iter()
        .max_by(|(da, ca), (db, cb)| ca.cmp(cb).then_with(|| db.cmp(da)))
        .map(|(domain, count)| (domain.to_string(), count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Categorized, Category, ClassifiedRecord, Record};

    fn classified(id: usize, subject: &str, sender: &str, category: Category) -> ClassifiedRecord {
        ClassifiedRecord {
            record: Record {
                id: id.to_string(),
                subject: subject.to_string(),
                sender: sender.to_string(),
                preview: String::new(),
                timestamp: "2024-01-01T00:00:00Z".to_string(),
            },
            category,
        }
    }

    fn batch(needs_reply: usize, important: usize, ignore: usize) -> BatchResult {
        let mut categorized = Categorized::default();
        let mut id = 0;
        for _ in 0..needs_reply {
            id += 1;
            categorized.push(classified(id, "hello", "a@x.com", Category::NeedsReply));
        }
        for _ in 0..important {
            id += 1;
            categorized.push(classified(id, "note", "b@y.com", Category::Important));
        }
        for _ in 0..ignore {
            id += 1;
            categorized.push(classified(id, "promo", "c@z.com", Category::Ignore));
        }
        BatchResult {
            categorized,
            total: needs_reply + important + ignore,
            processing_time: Duration::from_millis(500),
        }
    }

    fn kinds(insights: &[Insight]) -> Vec<InsightKind> {
        insights.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn backlog_over_ten_is_high_and_excludes_medium() {
        let insights = generate(&batch(12, 4, 4), &KeywordSets::default());
        let backlog: Vec<_> = insights
            .iter()
            .filter(|i| i.kind == InsightKind::ReplyBacklog)
            .collect();
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].severity, Severity::High);
        assert!(backlog[0].message.contains("12"));
    }

    #[test]
    fn backlog_between_six_and_ten_is_medium() {
        let insights = generate(&batch(6, 0, 0), &KeywordSets::default());
        let backlog = insights
            .iter()
            .find(|i| i.kind == InsightKind::ReplyBacklog)
            .unwrap();
        assert_eq!(backlog.severity, Severity::Medium);
    }

    #[test]
    fn no_backlog_at_or_below_five() {
        let insights = generate(&batch(5, 0, 0), &KeywordSets::default());
        assert!(!kinds(&insights).contains(&InsightKind::ReplyBacklog));
    }

    #[test]
    fn dominance_requires_both_share_and_count() {
        // 21 of 30 is 70%: fires.
        let insights = generate(&batch(5, 4, 21), &KeywordSets::default());
        let dominance = insights
            .iter()
            .find(|i| i.kind == InsightKind::LowPriorityDominance)
            .unwrap();
        assert!(dominance.message.contains("70%"));

        // 15 of 20 is 75% but the count is too small: does not fire.
        let insights = generate(&batch(3, 2, 15), &KeywordSets::default());
        assert!(!kinds(&insights).contains(&InsightKind::LowPriorityDominance));
    }

    #[test]
    fn topic_terms_fire_high_severity() {
        let mut result = batch(1, 0, 0);
        result
            .categorized
            .push(classified(99, "Assignment due Friday", "t@school.edu", Category::Important));
        result.total += 1;
        let insights = generate(&result, &KeywordSets::default());
        let topic = insights
            .iter()
            .find(|i| i.kind == InsightKind::TopicDetected)
            .unwrap();
        assert_eq!(topic.severity, Severity::High);
        assert!(topic.message.contains('1'));
    }

    #[test]
    fn topic_scan_skips_the_ignore_bucket() {
        let mut result = batch(0, 0, 0);
        result
            .categorized
            .push(classified(1, "Assignment digest", "promo@shop.com", Category::Ignore));
        result.total = 1;
        let insights = generate(&result, &KeywordSets::default());
        assert!(!kinds(&insights).contains(&InsightKind::TopicDetected));
    }

    #[test]
    fn sender_concentration_names_the_top_domain() {
        let mut categorized = Categorized::default();
        for id in 0..7 {
            categorized.push(classified(id, "hello", "prof@school.edu", Category::Important));
        }
        categorized.push(classified(100, "hi", "a@elsewhere.com", Category::NeedsReply));
        let result = BatchResult {
            categorized,
            total: 8,
            processing_time: Duration::from_millis(500),
        };
        let insights = generate(&result, &KeywordSets::default());
        let concentration = insights
            .iter()
            .find(|i| i.kind == InsightKind::SenderConcentration)
            .unwrap();
        assert!(concentration.message.contains("school.edu"));
        assert!(concentration.message.contains('7'));
    }

    #[test]
    fn all_clear_needs_an_empty_reply_bucket_and_volume() {
        let insights = generate(&batch(0, 6, 6), &KeywordSets::default());
        assert!(kinds(&insights).contains(&InsightKind::AllClear));

        let insights = generate(&batch(0, 3, 3), &KeywordSets::default());
        assert!(!kinds(&insights).contains(&InsightKind::AllClear));
    }

    #[test]
    fn fast_processing_cites_the_duration() {
        let mut result = batch(1, 1, 1);
        result.processing_time = Duration::from_millis(2);
        let insights = generate(&result, &KeywordSets::default());
        let fast = insights
            .iter()
            .find(|i| i.kind == InsightKind::FastProcessing)
            .unwrap();
        assert!(fast.message.contains("ms"));
    }

    #[test]
    fn ordered_by_severity_with_stable_rule_order() {
        let mut result = batch(12, 0, 0);
        result
            .categorized
            .push(classified(99, "Homework due", "t@school.edu", Category::Important));
        result.total += 1;
        result.processing_time = Duration::from_millis(1);
        let insights = generate(&result, &KeywordSets::default());

        // Both high-severity rules fired; backlog comes first in the table.
        assert_eq!(insights[0].kind, InsightKind::ReplyBacklog);
        assert_eq!(insights[1].kind, InsightKind::TopicDetected);
        let ranks: Vec<_> = insights.iter().map(|i| i.severity.rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn generation_is_deterministic() {
        let result = batch(12, 3, 25);
        let a = generate(&result, &KeywordSets::default());
        let b = generate(&result, &KeywordSets::default());
        assert_eq!(kinds(&a), kinds(&b));
        let msgs_a: Vec<_> = a.iter().map(|i| i.message.clone()).collect();
        let msgs_b: Vec<_> = b.iter().map(|i| i.message.clone()).collect();
        assert_eq!(msgs_a, msgs_b);
    }

    #[test]
    fn empty_insight_list_is_valid() {
        // Slow batch, nothing notable: no insights is a valid terminal state.
        let insights = generate(&batch(1, 1, 1), &KeywordSets::default());
        assert!(insights.is_empty());
    }
}
