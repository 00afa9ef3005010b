//! Email triage library: classifies message summaries into `needs_reply`,
//! `important`, and `ignore` buckets, derives batch insights, and exposes the
//! pipeline via HTTP.

pub mod classifier;
mod error;
mod http;
pub mod insights;
pub mod keywords;
pub mod model;
pub mod record;
pub mod view;

pub use error::{Error, Result};
pub use record::{BatchResult, Category, ClassifiedRecord, Record};

use classifier::{Classify, RuleClassifier};
use keywords::KeywordSets;
use model::{ModelClassifier, ModelOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Configuration options for the triage server.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    pub http_port: Option<u16>,
    pub max_batch: Option<usize>,
    /// JSON file overriding the built-in keyword sets.
    pub keywords_path: Option<String>,
    /// When set, the model-backed strategy is selected at startup.
    pub model: Option<ModelOptions>,
}

/// Running server handle.
pub struct RunningServer {
    pub http_addr: SocketAddr,
    http_handle: tokio::task::JoinHandle<()>,
    shutdown_tx: broadcast::Sender<()>,
}

impl RunningServer {
    /// Stop the server gracefully.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.http_handle.await;
    }
}

/// Start the triage server with the given options.
pub async fn start_server(opts: ServerOptions) -> Result<RunningServer> {
    let http_port = opts.http_port.unwrap_or(8000);
    let max_batch = opts.max_batch.unwrap_or(100);

    let keywords = match &opts.keywords_path {
        Some(path) => KeywordSets::from_file(path)?,
        None => KeywordSets::default(),
    };

    // The strategy is fixed for the process lifetime; a model that cannot be
    // configured degrades to rules rather than failing startup.
    let classifier: Arc<dyn Classify> = match opts.model {
        Some(model_opts) => {
            match ModelClassifier::new(model_opts, RuleClassifier::new(&keywords)) {
                Ok(model) => Arc::new(model),
                Err(e) => {
                    tracing::warn!("model strategy unavailable, using rules: {e}");
                    Arc::new(RuleClassifier::new(&keywords))
                }
            }
        }
        None => Arc::new(RuleClassifier::new(&keywords)),
    };
    tracing::info!("classifier strategy: {}", classifier.name());

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let listener = TcpListener::bind(("0.0.0.0", http_port)).await?;
    let http_addr = listener.local_addr()?;

    println!(
        "HTTP server listening on port {}, classification at /classify",
        http_addr.port()
    );

    let state = http::AppState {
        classifier,
        keywords: Arc::new(keywords),
        max_batch,
    };
    let http_shutdown = shutdown_tx.subscribe();
    let http_handle = tokio::spawn(async move {
        http::run_http_server(listener, state, http_shutdown).await;
    });

    Ok(RunningServer {
        http_addr,
        http_handle,
        shutdown_tx,
    })
}
