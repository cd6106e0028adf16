use std::sync::Arc;

use crate::bot::BotScorer;
use crate::config::Args;
use crate::error::Result;
use crate::policy::PolicyTable;
use crate::rate_limit::RateLimiter;

// app's shared state
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub policies: PolicyTable,
    pub scorer: BotScorer,
}

impl AppState {
    pub fn new(limiter: Arc<RateLimiter>, policies: PolicyTable, scorer: BotScorer) -> Self {
        Self {
            limiter,
            policies,
            scorer,
        }
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        Ok(Self::new(
            Arc::new(RateLimiter::default()),
            args.policy_table()?,
            BotScorer::with_threshold(args.bot_threshold),
        ))
    }
}
