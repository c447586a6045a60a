use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use url::Url;

use crate::AppState;
use crate::api::models::{SummarizeRequest, SummarizeResponse};
use crate::api::response;
use crate::error::{AppError, Result};
use crate::extract::extract;
use crate::validate::{ValidationOptions, validate_url};

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/summarize", post(summarize_handler))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn healthz() -> &'static str {
    "OK"
}

async fn not_found() -> Response {
    response::error(StatusCode::NOT_FOUND, "Not Found".to_string())
}

async fn summarize_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SummarizeResponse>)> {
    let Json(req) = payload.map_err(|rejection| AppError::BadRequestBody(rejection.body_text()))?;

    info!(url = %req.url, "processing summarize request");
    let start_time = Instant::now();

    let result = within_deadline(
        state.config.request_timeout,
        process_summarize_request(&state, &req),
    )
    .await;

    let elapsed = start_time.elapsed();

    match result {
        Ok(summary) => {
            info!(url = %req.url, ?elapsed, bullets = summary.bullets.len(), "summarized");
            Ok(response::created(summary))
        }
        Err(err) => {
            warn!(
                url = %req.url,
                ?elapsed,
                status = err.status().as_u16(),
                error = %err,
                "summarize request failed"
            );
            Err(err)
        }
    }
}

/// Runs `fut`, failing with `AppError::Timeout` once `deadline` passes.
async fn within_deadline<T, F>(deadline: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .unwrap_or(Err(AppError::Timeout))
}

async fn process_summarize_request(
    state: &AppState,
    req: &SummarizeRequest,
) -> Result<SummarizeResponse> {
    let options = ValidationOptions::from(state.config.as_ref());
    let url = validate_url(&req.url, &state.http, &options).await?;
    summarize_page(state, &url).await
}

/// Extraction and summarization for a URL that already passed validation.
async fn summarize_page(state: &AppState, url: &Url) -> Result<SummarizeResponse> {
    let text = extract(&state.http, url, state.config.max_extract_bytes).await?;
    let summary = state.summarizer.summarize(&text).await?;
    Ok(summary.into())
}
