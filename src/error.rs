use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::rate_limit::RateLimitResult;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        result: RateLimitResult,
        retry_after_secs: u64,
    },

    #[error("metrics encoding failed: {0}")]
    Metrics(String),
}

pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        GuardError::InvalidArgument(msg.into())
    }

    fn code(&self) -> &'static str {
        match self {
            GuardError::InvalidArgument(_) => "INVALID_ARGUMENT",
            GuardError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            GuardError::Metrics(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GuardError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            GuardError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GuardError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// X-RateLimit-* headers, values straight from the result
pub fn rate_limit_headers(result: &RateLimitResult) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-ratelimit-limit", HeaderValue::from(result.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(result.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(result.reset));
    headers
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, http_status = %status, "request failed");
        } else {
            tracing::debug!(error = %self, http_status = %status, "request rejected");
        }

        let body = Json(serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        match self {
            GuardError::RateLimited {
                result,
                retry_after_secs,
            } => {
                let mut headers = rate_limit_headers(&result);
                headers.insert("retry-after", HeaderValue::from(retry_after_secs));
                (status, headers, body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
