// src/web/error.rs
// HTTP mapping for pipeline errors

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tracing::error;

use crate::error::VibeError;

/// Standard API error response: `{ "error": <message>, "code": <CODE> }`
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: &'static str,
    pub retry_after: Option<Duration>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::BAD_REQUEST,
            error_code: "BAD_REQUEST",
            retry_after: None,
        }
    }

    pub fn too_many_requests(retry_after: Duration) -> Self {
        Self {
            message: "Rate limit exceeded. Please try again later.".to_string(),
            status_code: StatusCode::TOO_MANY_REQUESTS,
            error_code: "RATE_LIMITED",
            retry_after: Some(retry_after),
        }
    }

    pub fn method_not_allowed() -> Self {
        Self {
            message: "Method not allowed".to_string(),
            status_code: StatusCode::METHOD_NOT_ALLOWED,
            error_code: "METHOD_NOT_ALLOWED",
            retry_after: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            error_code: "INTERNAL_ERROR",
            retry_after: None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<VibeError> for ApiError {
    fn from(err: VibeError) -> Self {
        match err {
            VibeError::Validation(message) => ApiError::bad_request(message),
            VibeError::RateLimited { retry_after } => ApiError::too_many_requests(retry_after),
            other => {
                // Upstream errors are absorbed by the pipeline; reaching here is a fault
                error!(error = %other, "Pipeline fault");
                ApiError::internal("Something went wrong while scoring the vibe.")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "code": self.error_code,
        }));
        let mut response = (self.status_code, body).into_response();

        if let Some(retry_after) = self.retry_after {
            let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
