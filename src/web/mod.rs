// src/web/mod.rs
// HTTP surface for the analysis pipeline

pub mod client_key;
pub mod error;
pub mod handlers;
pub mod state;

pub use client_key::ClientKey;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as CorsAny, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

/// A panic anywhere below the router is an unrecoverable pipeline fault
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        json!({
            "error": "Something went wrong while scoring the vibe.",
            "code": "INTERNAL_ERROR",
        })
        .to_string(),
    )
        .into_response()
}

async fn method_not_allowed_fallback() -> ApiError {
    ApiError::method_not_allowed()
}

/// Create the web server router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(CorsAny)
        .allow_methods(CorsAny)
        .allow_headers(CorsAny);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        // Legacy path for existing web front ends
        .route("/api/analyze", post(handlers::analyze))
        .method_not_allowed_fallback(method_not_allowed_fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}
