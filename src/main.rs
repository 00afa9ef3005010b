//! CLI entry point for mail-triage.

use clap::Parser;
use mail_triage::model::ModelOptions;
use mail_triage::{start_server, ServerOptions};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mail-triage")]
#[command(about = "Classify email summaries into reply/important/ignore buckets over HTTP")]
struct Cli {
    /// HTTP port to listen on
    #[arg(short = 'p', long, default_value = "8000")]
    http_port: u16,

    /// Maximum number of messages accepted per classification request
    #[arg(short = 'm', long, default_value = "100")]
    max_batch: usize,

    /// JSON file overriding the built-in keyword sets
    #[arg(short = 'k', long)]
    keywords: Option<String>,

    /// Enable the model-backed classification strategy
    #[arg(long, env = "USE_MODEL")]
    model: bool,

    /// Base URL of the zero-shot inference endpoint
    #[arg(long, env = "MODEL_ENDPOINT", default_value = "http://127.0.0.1:8080")]
    model_endpoint: String,

    /// Model identifier passed to the inference endpoint
    #[arg(long, env = "MODEL_NAME", default_value = "typeform/distilbert-base-uncased-mnli")]
    model_name: String,

    /// Ask the inference endpoint to run on an accelerator
    #[arg(long, env = "USE_GPU")]
    model_gpu: bool,

    /// Per-call inference timeout in seconds
    #[arg(long, default_value = "10")]
    model_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> mail_triage::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let model = cli.model.then(|| ModelOptions {
        endpoint: cli.model_endpoint,
        model: cli.model_name,
        use_gpu: cli.model_gpu,
        timeout: Duration::from_secs(cli.model_timeout_secs),
    });

    let opts = ServerOptions {
        http_port: Some(cli.http_port),
        max_batch: Some(cli.max_batch),
        keywords_path: cli.keywords,
        model,
    };

    let server = start_server(opts).await?;

    // Wait for Ctrl+C
    tokio::signal::ctrl_c().await?;
    server.stop().await;

    Ok(())
}
