use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::USER_AGENT},
};
use std::sync::Arc;

use crate::bot::{
    BotDetectionResult, InteractionData, InteractionReport, WalletBehavior, WalletVerdict,
    analyze_interaction_quality, validate_wallet_behavior,
};
use crate::metrics::{BOT_EVALUATIONS, BOT_FLAGGED};
use crate::models::AssessmentRequest;
use crate::state::AppState;

pub(crate) fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
}

pub(crate) fn record_bot_result(result: &BotDetectionResult) {
    BOT_EVALUATIONS.inc();
    if result.is_bot {
        BOT_FLAGGED.inc();
        tracing::info!(score = result.score, reasons = ?result.reasons, "bot signals detected");
    }
}

pub async fn score_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AssessmentRequest>,
) -> Json<BotDetectionResult> {
    let bundle = payload.into_bundle(user_agent(&headers));
    let result = state.scorer.score(&bundle);
    record_bot_result(&result);
    Json(result)
}

pub async fn interaction_handler(Json(payload): Json<InteractionData>) -> Json<InteractionReport> {
    Json(analyze_interaction_quality(&payload))
}

pub async fn wallet_handler(Json(payload): Json<WalletBehavior>) -> Json<WalletVerdict> {
    let verdict = validate_wallet_behavior(&payload);
    if let Some(reason) = verdict.reason {
        tracing::info!(reason, "suspicious wallet behaviour");
    }
    Json(verdict)
}
