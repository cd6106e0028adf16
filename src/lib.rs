//! Request throttling and bot screening for the ticketing API.
//!
//! Two independent cores: a fixed-window [`rate_limit::RateLimiter`] over an
//! injectable store, and the pure scorers in [`bot`]. The axum router in
//! [`app`] wires both behind HTTP.

pub mod bot;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod rate_limit;
pub mod state;
pub mod store;
pub mod sweeper;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use std::sync::Arc;

use crate::handlers::{
    assess_purchase_handler, check_rate_limit_handler, health_handler, interaction_handler,
    metrics_handler, score_handler, wallet_handler,
};
use crate::middleware::{RateLimitGuard, rate_limit_middleware, request_metrics};
use crate::policy::ActionCategory;
use crate::state::AppState;

fn guard(state: &Arc<AppState>, action: ActionCategory) -> RateLimitGuard {
    RateLimitGuard::new(Arc::clone(state), action)
}

pub fn app(state: Arc<AppState>) -> Router {
    let purchase = Router::new()
        .route("/api/purchase/assess", post(assess_purchase_handler))
        .route_layer(from_fn_with_state(
            guard(&state, ActionCategory::Purchase),
            rate_limit_middleware,
        ));

    let scoring = Router::new()
        .route("/api/bot/score", post(score_handler))
        .route("/api/bot/interaction", post(interaction_handler))
        .route("/api/bot/wallet", post(wallet_handler))
        .route_layer(from_fn_with_state(
            guard(&state, ActionCategory::Read),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/rate-limit/check", post(check_rate_limit_handler))
        .merge(purchase)
        .merge(scoring)
        .layer(from_fn(request_metrics))
        .with_state(state)
}
