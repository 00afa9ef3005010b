//! Keyword sets used by the rule classifier and the topic insight.
//!
//! These are configuration data rather than code: deployments can replace any
//! set from a JSON file without touching the decision logic.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Per-category keyword lists plus the topic terms used by insights.
///
/// The three category sets are disjoint; the classifier checks them in a fixed
/// priority order, so a term's set decides where ties land.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeywordSets {
    /// Bulk/automated mail markers.
    pub ignore: Vec<String>,
    /// Action/request/question terms directed at the recipient.
    pub reply: Vec<String>,
    /// Significance terms that do not require a reply.
    pub important: Vec<String>,
    /// Assignment/deadline-style terms scanned by the topic insight.
    pub topics: Vec<String>,
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            ignore: to_strings(&[
                "unsubscribe",
                "newsletter",
                "promotion",
                "promotional",
                "marketing",
                "advertisement",
                "spam",
                "no-reply",
                "noreply",
                "donotreply",
                "automated",
                "digest",
                "subscription",
                "special offer",
                "limited time",
                "discount",
                "sale",
            ]),
            reply: to_strings(&[
                "?",
                "please",
                "question",
                "request",
                "urgent",
                "asap",
                "deadline",
                "respond",
                "reply",
                "answer",
                "confirm",
                "meeting",
                "call",
                "schedule",
                "availability",
                "feedback",
                "action required",
                "need your",
                "would you",
                "can you",
                "could you",
                "fill out",
            ]),
            important: to_strings(&[
                "important",
                "critical",
                "priority",
                "approval",
                "decision",
                "review",
                "announcement",
                "notice",
                "reminder",
                "update",
                "confirmation",
                "due date",
                "report",
                "project",
            ]),
            topics: to_strings(&[
                "assignment",
                "homework",
                "due",
                "deadline",
                "submit",
                "complete",
                "exam",
                "quiz",
                "syllabus",
            ]),
        }
    }
}

impl KeywordSets {
    /// Load keyword sets from a JSON file. Missing keys fall back to the
    /// built-in defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read keyword file {}: {e}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("invalid keyword file {}: {e}", path.display())))
    }
}

fn to_strings(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| (*t).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_sets_are_disjoint() {
        let sets = KeywordSets::default();
        let ignore: HashSet<_> = sets.ignore.iter().collect();
        let reply: HashSet<_> = sets.reply.iter().collect();
        let important: HashSet<_> = sets.important.iter().collect();
        assert!(ignore.is_disjoint(&reply));
        assert!(ignore.is_disjoint(&important));
        assert!(reply.is_disjoint(&important));
    }

    #[test]
    fn partial_override_keeps_default_sets() {
        let sets: KeywordSets = serde_json::from_str(r#"{"ignore": ["bulk"]}"#).unwrap();
        assert_eq!(sets.ignore, vec!["bulk".to_string()]);
        assert!(!sets.reply.is_empty());
        assert!(!sets.topics.is_empty());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = KeywordSets::from_file("/nonexistent/keywords.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
