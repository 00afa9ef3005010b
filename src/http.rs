//! HTTP API: classification endpoint plus service metadata.

use crate::classifier::{run_batch, Classify};
use crate::error::Error;
use crate::insights::{self, Insight};
use crate::keywords::KeywordSets;
use crate::record::{sanitize_batch, Categorized, Record};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};

const SERVICE_NAME: &str = "mail-triage";

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classify>,
    pub keywords: Arc<KeywordSets>,
    pub max_batch: usize,
}

#[derive(Debug, Deserialize)]
struct ClassifyRequest {
    messages: Vec<Record>,
}

#[derive(Debug, Serialize)]
struct ClassifyResponse {
    success: bool,
    categorized: Categorized,
    total: usize,
    processed_at: String,
    processing_time_ms: f64,
    insights: Vec<Insight>,
}

/// Run the HTTP server until shutdown is signalled.
pub async fn run_http_server(
    listener: TcpListener,
    state: AppState,
    mut shutdown: broadcast::Receiver<()>,
) {
    let app = Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/classify", post(classify_messages))
        .fallback(not_found)
        .with_state(state);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
    {
        error!("HTTP server error: {e}");
    }
}

async fn service_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "classifier": state.classifier.name(),
        "endpoints": {
            "health": "/health",
            "classify": "/classify"
        }
    }))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339()
    }))
}

async fn classify_messages(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Response {
    if request.messages.len() > state.max_batch {
        return error_response(
            StatusCode::BAD_REQUEST,
            "BATCH_TOO_LARGE",
            format!(
                "batch of {} exceeds the maximum of {}",
                request.messages.len(),
                state.max_batch
            ),
        );
    }

    let submitted = request.messages.len();
    let records = sanitize_batch(request.messages);
    info!(
        "classification request: {submitted} messages, {} valid",
        records.len()
    );

    match run_batch(state.classifier.as_ref(), &records).await {
        Ok(result) => {
            let insights = insights::generate(&result, &state.keywords);
            let processing_time_ms =
                (result.processing_time.as_secs_f64() * 1000.0 * 100.0).round() / 100.0;
            info!(
                "classification complete: needs_reply={}, important={}, ignore={}, time={processing_time_ms}ms",
                result.categorized.needs_reply.len(),
                result.categorized.important.len(),
                result.categorized.ignore.len(),
            );
            Json(ClassifyResponse {
                success: true,
                categorized: result.categorized,
                total: result.total,
                processed_at: Utc::now().to_rfc3339(),
                processing_time_ms,
                insights,
            })
            .into_response()
        }
        Err(Error::EmptyBatch) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "EMPTY_BATCH",
            "no valid messages after validation".to_string(),
        ),
        Err(e) => {
            error!("classification failed: {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error".to_string(),
            )
        }
    }
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "not found".to_string())
}

fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    (
        status,
        Json(json!({
            "error": true,
            "message": message,
            "code": code
        })),
    )
        .into_response()
}
