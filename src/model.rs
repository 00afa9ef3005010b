//! Model-backed classification via a remote zero-shot inference endpoint.
//!
//! Every call carries a bounded timeout; any transport failure, non-success
//! status, or unmappable response falls back to the rule-based strategy, so
//! classification always produces a result.

use crate::classifier::{Classify, RuleClassifier};
use crate::error::{Error, Result};
use crate::record::{Category, Record};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Labels presented to the zero-shot model, in category order.
const CANDIDATE_LABELS: [&str; 3] = ["needs reply", "important", "ignore"];

/// Configuration for the model-backed strategy.
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Base URL of the inference service.
    pub endpoint: String,
    /// Model identifier resolved by the inference service.
    pub model: String,
    /// Ask the inference service to run on an accelerator.
    pub use_gpu: bool,
    /// Per-call timeout; on expiry the call falls back to rules.
    pub timeout: Duration,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
    options: InferenceCallOptions,
}

#[derive(Serialize)]
struct InferenceParameters<'a> {
    candidate_labels: &'a [&'a str],
}

#[derive(Serialize)]
struct InferenceCallOptions {
    use_gpu: bool,
}

#[derive(Deserialize)]
struct InferenceResponse {
    labels: Vec<String>,
    #[allow(dead_code)]
    scores: Vec<f64>,
}

/// Zero-shot strategy with a deterministic rule fallback.
#[derive(Debug)]
pub struct ModelClassifier {
    client: reqwest::Client,
    options: ModelOptions,
    fallback: RuleClassifier,
}

impl ModelClassifier {
    /// Build the strategy. Fails only on bad configuration; call-time errors
    /// are recovered by the fallback instead.
    pub fn new(options: ModelOptions, fallback: RuleClassifier) -> Result<Self> {
        if options.endpoint.is_empty() {
            return Err(Error::Config("model endpoint is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            options,
            fallback,
        })
    }

    /// Text presented to the model: sender, subject, preview, and the sender
    /// domain as extra context.
    fn prepare_text(record: &Record) -> String {
        let mut parts = vec![
            format!("From: {}", record.sender),
            format!("Subject: {}", record.subject),
        ];
        if !record.preview.is_empty() {
            parts.push(format!("Content: {}", record.preview));
        }
        if let Some(domain) = record.sender.rsplit_once('@').map(|(_, d)| d) {
            if !domain.is_empty() {
                parts.push(format!("Domain: {domain}"));
            }
        }
        parts.join(" | ")
    }

    async fn infer(&self, record: &Record) -> Result<Category> {
        let text = Self::prepare_text(record);
        let url = format!(
            "{}/models/{}",
            self.options.endpoint.trim_end_matches('/'),
            self.options.model
        );
        let request = InferenceRequest {
            inputs: &text,
            parameters: InferenceParameters {
                candidate_labels: &CANDIDATE_LABELS,
            },
            options: InferenceCallOptions {
                use_gpu: self.options.use_gpu,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Model(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Model(format!(
                "inference endpoint returned {}",
                response.status()
            )));
        }
        let body: InferenceResponse = response
            .json()
            .await
            .map_err(|e| Error::Model(format!("invalid inference response: {e}")))?;

        let top = body
            .labels
            .first()
            .ok_or_else(|| Error::Model("inference response has no labels".to_string()))?;
        map_label(top).ok_or_else(|| Error::Model(format!("unknown label: {top}")))
    }
}

/// Map a model label back onto the category enumeration.
fn map_label(label: &str) -> Option<Category> {
    let label = label.to_lowercase();
    if label.contains("reply") {
        Some(Category::NeedsReply)
    } else if label.contains("important") {
        Some(Category::Important)
    } else if label.contains("ignore") {
        Some(Category::Ignore)
    } else {
        None
    }
}

#[async_trait]
impl Classify for ModelClassifier {
    async fn classify(&self, record: &Record) -> Category {
        match self.infer(record).await {
            Ok(category) => {
                debug!("record {} classified as {} by model", record.id, category.as_str());
                category
            }
            Err(e) => {
                warn!("model inference failed for record {}, using rule fallback: {e}", record.id);
                self.fallback.classify_record(record)
            }
        }
    }

    fn name(&self) -> &'static str {
        "model"
    }
}
