// src/web/handlers.rs
// HTTP handlers for the analysis API

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::client_key::ClientKey;
use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::pipeline::AnalysisRequest;

/// Response header naming where the report came from (`live` or `mock`)
pub const SOURCE_HEADER: &str = "x-vibe-source";

const INVALID_TEXT: &str = "Missing or invalid `text` in request body";

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let mode = if state.pipeline.is_live() { "live" } else { "mock" };
    Json(json!({ "status": "ok", "mode": mode }))
}

/// Pull a non-blank `text` out of the request body; anything else is a 400
fn extract_text(body: &[u8]) -> ApiResult<String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request(INVALID_TEXT))?;
    value
        .get("text")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request(INVALID_TEXT))
}

/// POST /analyze - body `{ "text": "..." }`, answers with a VibeReport
#[instrument(skip(state, client_key, body), fields(client_key = %client_key.as_str()))]
pub async fn analyze(
    State(state): State<AppState>,
    client_key: ClientKey,
    body: Bytes,
) -> ApiResult<Response> {
    let text = extract_text(&body)?;
    info!(text_len = text.len(), "Analysis requested");

    let analysis = state
        .pipeline
        .analyze(AnalysisRequest::new(text, client_key.0))
        .await?;

    let mut response = Json(analysis.report).into_response();
    response.headers_mut().insert(
        SOURCE_HEADER,
        HeaderValue::from_static(analysis.source.as_str()),
    );
    Ok(response)
}
