//! HTTP API server for integration with other systems.
//!
//! Exposes extraction and summarization over JSON.

use crate::cli::output::user_message;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::KortError;
use crate::extraction::{ExtractedDocument, ExtractionAttempt};
use crate::pipeline::Pipeline;
use crate::summarize::SummarizationError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    pipeline: Pipeline,
    settings: Settings,
    default_api_key: Option<String>,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: &str,
    port: u16,
    api_key: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    let app = router(settings, api_key)?;

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Kort API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Extract", "POST /extract");
    Output::kv("Summarize", "POST /summarize");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(settings: Settings, default_api_key: Option<String>) -> anyhow::Result<Router> {
    let pipeline = Pipeline::new(&settings)?;

    let state = Arc::new(AppState {
        pipeline,
        settings,
        default_api_key: default_api_key.filter(|k| !k.trim().is_empty()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract))
        .route("/summarize", post(summarize))
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .with_state(state))
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ExtractRequest {
    url: String,
}

#[derive(Serialize)]
struct ExtractResponse {
    documents: Vec<ExtractedDocument>,
    attempts: Vec<ExtractionAttempt>,
}

#[derive(Deserialize)]
struct SummarizeRequest {
    url: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Serialize)]
struct SummarizeResponse {
    message: String,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    attempts: Vec<ExtractionAttempt>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attempts: Vec<ExtractionAttempt>,
}

/// HTTP status for a failed request.
fn error_status(err: &KortError) -> StatusCode {
    match err {
        KortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        KortError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        KortError::Summarization(SummarizationError::EmptyInput) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        KortError::Summarization(SummarizationError::ProviderError(_)) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: KortError) -> Response {
    let status = error_status(&err);
    if status.is_server_error() {
        warn!("Request failed: {}", err);
    }

    let attempts = match &err {
        KortError::Extraction(extraction) => extraction.attempts().to_vec(),
        _ => Vec::new(),
    };

    (
        status,
        Json(ErrorResponse {
            error: user_message(&err),
            attempts,
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn extract(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Response {
    match state.pipeline.extract(&req.url).await {
        Ok(report) => Json(ExtractResponse {
            documents: report.documents,
            attempts: report.attempts,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeRequest>,
) -> Response {
    let api_key = req
        .api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| state.default_api_key.clone())
        .unwrap_or_default();

    let result = match req.model.filter(|m| *m != state.settings.summarizer.model) {
        Some(model) => {
            let mut settings = state.settings.clone();
            settings.summarizer.model = model;
            match Pipeline::new(&settings) {
                Ok(pipeline) => pipeline.summarize(&req.url, &api_key).await,
                Err(e) => Err(e),
            }
        }
        None => state.pipeline.summarize(&req.url, &api_key).await,
    };

    match result {
        Ok(outcome) => Json(SummarizeResponse {
            message: "Summary generated successfully!".to_string(),
            title: outcome.title().map(str::to_string),
            summary: outcome.summary,
            attempts: outcome.attempts,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}
