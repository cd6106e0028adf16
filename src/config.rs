use clap::Parser;
use std::time::Duration;

use crate::error::Result;
use crate::policy::{ActionCategory, PolicyCaps, PolicyTable, RateLimitPolicy};

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "ticket-guard")]
#[command(about = "Rate limiting and bot screening for the ticketing API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Default rate limit max requests per window
    #[arg(long, default_value_t = 10)]
    pub rate_limit: u32,

    // Default rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // Ticket purchases
    #[arg(long, default_value_t = 5)]
    pub purchase_limit: u32,
    #[arg(long, default_value_t = 60)]
    pub purchase_window: u64,

    // Ticket transfers
    #[arg(long, default_value_t = 10)]
    pub transfer_limit: u32,
    #[arg(long, default_value_t = 60)]
    pub transfer_window: u64,

    // Refund requests
    #[arg(long, default_value_t = 3)]
    pub refund_limit: u32,
    #[arg(long, default_value_t = 60)]
    pub refund_window: u64,

    // Attendee messaging
    #[arg(long, default_value_t = 30)]
    pub message_limit: u32,
    #[arg(long, default_value_t = 60)]
    pub message_window: u64,

    // Informational reads
    #[arg(long, default_value_t = 100)]
    pub read_limit: u32,
    #[arg(long, default_value_t = 60)]
    pub read_window: u64,

    // Longest window, in seconds, a /api/rate-limit/check caller may request
    #[arg(long, default_value_t = 3600)]
    pub max_window: u64,

    // Largest quota a /api/rate-limit/check caller may request
    #[arg(long, default_value_t = 1000)]
    pub max_quota: u32,

    // Seconds between expired-entry sweeps
    #[arg(long, default_value_t = 60)]
    pub sweep_interval: u64,

    // Score at which a signal bundle counts as a bot
    #[arg(long, default_value_t = 50)]
    pub bot_threshold: u32,
}

impl Default for Args {
    fn default() -> Self {
        Args::parse_from(["ticket-guard"])
    }
}

impl Args {
    /// Builds the per-action presets, rejecting zero limits or windows.
    pub fn policy_table(&self) -> Result<PolicyTable> {
        let presets = [
            (ActionCategory::Purchase, self.purchase_limit, self.purchase_window),
            (ActionCategory::Transfer, self.transfer_limit, self.transfer_window),
            (ActionCategory::Refund, self.refund_limit, self.refund_window),
            (ActionCategory::Message, self.message_limit, self.message_window),
            (ActionCategory::Read, self.read_limit, self.read_window),
        ];

        let default = RateLimitPolicy::per_seconds(self.rate_limit, self.rate_window)?;
        let table = PolicyTable::new(default).with_caps(self.policy_caps()?);
        presets
            .into_iter()
            .try_fold(table, |table, (action, limit, window)| {
                Ok(table.with(action, RateLimitPolicy::per_seconds(limit, window)?))
            })
    }

    /// Caller caps must themselves be a valid policy.
    pub fn policy_caps(&self) -> Result<PolicyCaps> {
        let widest = RateLimitPolicy::per_seconds(self.max_quota, self.max_window)?;
        Ok(PolicyCaps {
            max_window_ms: widest.window_ms,
            max_requests: widest.max_requests,
        })
    }

    pub fn sweep_every(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }
}
