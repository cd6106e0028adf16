use std::sync::Arc;
use tokio::time::{Duration, interval};

use crate::metrics::{SWEPT_ENTRIES, TRACKED_KEYS};
use crate::rate_limit::RateLimiter;

// One sweep pass plus gauge bookkeeping
pub fn sweep_once(limiter: &RateLimiter) -> usize {
    let removed = limiter.sweep_expired();
    SWEPT_ENTRIES.inc_by(removed as f64);
    TRACKED_KEYS.set(limiter.tracked_keys() as f64);
    if removed > 0 {
        tracing::debug!(removed, remaining = limiter.tracked_keys(), "swept expired rate limit entries");
    }
    removed
}

// Periodic sweeper - bounds memory held by stale windows
pub async fn sweeper(limiter: Arc<RateLimiter>, every: Duration) {
    let mut interval = interval(every);

    tracing::info!(interval = ?every, "rate limit sweeper started");

    loop {
        interval.tick().await;
        sweep_once(&limiter);
    }
}
