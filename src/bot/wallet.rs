use serde::Serialize;

use super::signals::WalletBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalletVerdict {
    pub suspicious: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl WalletVerdict {
    fn clean() -> Self {
        Self {
            suspicious: false,
            reason: None,
        }
    }

    fn flagged(reason: &'static str) -> Self {
        Self {
            suspicious: true,
            reason: Some(reason),
        }
    }
}

fn connection_storm(w: &WalletBehavior) -> bool {
    w.connection_attempts > 10 && w.time_range < 60_000
}

fn failing_connections(w: &WalletBehavior) -> bool {
    let failure_rate = w.failed_attempts as f64 / w.connection_attempts.max(1) as f64;
    failure_rate > 0.8 && w.connection_attempts > 5
}

fn transaction_burst(w: &WalletBehavior) -> bool {
    w.transaction_attempts > 5 && w.time_range < 10_000
}

// Checked in order; the first hit decides
const WALLET_RULES: &[(fn(&WalletBehavior) -> bool, &str)] = &[
    (connection_storm, "Too many wallet connection attempts"),
    (failing_connections, "Unusually high connection failure rate"),
    (transaction_burst, "Too many transaction attempts"),
];

pub fn validate_wallet_behavior(data: &WalletBehavior) -> WalletVerdict {
    WALLET_RULES
        .iter()
        .find(|(matches, _)| matches(data))
        .map(|(_, reason)| WalletVerdict::flagged(*reason))
        .unwrap_or_else(WalletVerdict::clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_storm_matches_first_rule() {
        let verdict = validate_wallet_behavior(&WalletBehavior {
            connection_attempts: 15,
            successful_connections: 2,
            failed_attempts: 13,
            transaction_attempts: 0,
            time_range: 30_000,
        });
        assert!(verdict.suspicious);
        assert_eq!(verdict.reason, Some("Too many wallet connection attempts"));
    }

    #[test]
    fn high_failure_rate_over_long_window() {
        let verdict = validate_wallet_behavior(&WalletBehavior {
            connection_attempts: 15,
            failed_attempts: 13,
            time_range: 120_000,
            ..Default::default()
        });
        assert_eq!(verdict.reason, Some("Unusually high connection failure rate"));
    }

    #[test]
    fn failure_rate_needs_more_than_five_attempts() {
        let verdict = validate_wallet_behavior(&WalletBehavior {
            connection_attempts: 5,
            failed_attempts: 5,
            time_range: 120_000,
            ..Default::default()
        });
        assert!(!verdict.suspicious);
    }

    #[test]
    fn transaction_burst() {
        let verdict = validate_wallet_behavior(&WalletBehavior {
            connection_attempts: 1,
            successful_connections: 1,
            transaction_attempts: 6,
            time_range: 9_000,
            ..Default::default()
        });
        assert_eq!(verdict.reason, Some("Too many transaction attempts"));
    }

    #[test]
    fn ordinary_wallet_is_clean() {
        let verdict = validate_wallet_behavior(&WalletBehavior {
            connection_attempts: 2,
            successful_connections: 2,
            transaction_attempts: 1,
            time_range: 300_000,
            ..Default::default()
        });
        assert_eq!(verdict, WalletVerdict { suspicious: false, reason: None });
        assert_eq!(
            serde_json::to_value(verdict).unwrap(),
            serde_json::json!({ "suspicious": false })
        );
    }
}
