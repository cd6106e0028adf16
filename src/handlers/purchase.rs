use axum::{Json, extract::State, http::HeaderMap};
use std::sync::Arc;

use super::bot::{record_bot_result, user_agent};
use crate::bot::{Assessment, Verdict, assess};
use crate::models::AssessmentRequest;
use crate::state::AppState;

// Gate in front of ticket purchase; rate limited by the purchase preset
pub async fn assess_purchase_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AssessmentRequest>,
) -> Json<Assessment> {
    let bundle = payload.into_bundle(user_agent(&headers));
    let assessment = assess(&bundle, &state.scorer);
    record_bot_result(&assessment.bot);

    if assessment.verdict != Verdict::Allow {
        tracing::info!(
            verdict = ?assessment.verdict,
            bot_score = assessment.bot.score,
            interaction_score = assessment.interaction.score,
            wallet_reason = ?assessment.wallet.reason,
            "purchase not cleared"
        );
    }
    Json(assessment)
}
