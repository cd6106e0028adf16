use lazy_static::lazy_static;
use prometheus::{
    Counter, Gauge, Histogram, IntCounterVec, register_counter, register_gauge,
    register_histogram, register_int_counter_vec,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("ticket_guard_requests_total", "Total number of requests").unwrap();
    pub static ref RATE_LIMIT_CHECKS: IntCounterVec = register_int_counter_vec!(
        "ticket_guard_rate_limit_checks_total",
        "Rate limit checks by action",
        &["action"]
    )
    .unwrap();
    pub static ref RATE_LIMIT_REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "ticket_guard_rate_limit_rejections_total",
        "Rate limit rejections by action",
        &["action"]
    )
    .unwrap();
    pub static ref TRACKED_KEYS: Gauge = register_gauge!(
        "ticket_guard_rate_limit_tracked_keys",
        "Current number of rate limit keys in the store"
    )
    .unwrap();
    pub static ref SWEPT_ENTRIES: Counter = register_counter!(
        "ticket_guard_rate_limit_swept_total",
        "Expired rate limit entries removed by the sweeper"
    )
    .unwrap();
    pub static ref BOT_EVALUATIONS: Counter =
        register_counter!("ticket_guard_bot_evaluations_total", "Bot signal bundles scored").unwrap();
    pub static ref BOT_FLAGGED: Counter =
        register_counter!("ticket_guard_bot_flagged_total", "Bundles scored as bots").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "ticket_guard_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
}
