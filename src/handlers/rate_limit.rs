use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;

use crate::error::{Result, rate_limit_headers};
use crate::middleware::enforce;
use crate::models::RateLimitCheckRequest;
use crate::state::AppState;

// Quota check for callers that enforce limits themselves (edge middleware)
pub async fn check_rate_limit_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RateLimitCheckRequest>,
) -> Result<impl IntoResponse> {
    let policy = payload.resolve_policy(&state.policies)?;
    let key = payload.namespaced_key();
    let result = enforce(&state.limiter, &key, policy, payload.action())?;
    Ok((rate_limit_headers(&result), Json(result)))
}
