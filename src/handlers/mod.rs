mod bot;
mod health;
mod metrics;
mod purchase;
mod rate_limit;

pub use bot::{interaction_handler, score_handler, wallet_handler};
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use purchase::assess_purchase_handler;
pub use rate_limit::check_rate_limit_handler;
