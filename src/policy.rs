use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{GuardError, Result};

/// Action categories that carry their own quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    Purchase,
    Transfer,
    Refund,
    Message,
    Read,
    Default,
}

impl ActionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCategory::Purchase => "purchase",
            ActionCategory::Transfer => "transfer",
            ActionCategory::Refund => "refund",
            ActionCategory::Message => "message",
            ActionCategory::Read => "read",
            ActionCategory::Default => "default",
        }
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Longest window any policy may carry (one day).
pub const MAX_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;
/// Largest quota any policy may carry.
pub const MAX_REQUESTS: u32 = 1_000_000;

// Window length and quota; both positive and within the hard ceilings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitPolicy {
    pub window_ms: u64,
    pub max_requests: u32,
}

impl RateLimitPolicy {
    pub fn new(window_ms: u64, max_requests: u32) -> Result<Self> {
        if window_ms == 0 {
            return Err(GuardError::invalid("window must be positive"));
        }
        if max_requests == 0 {
            return Err(GuardError::invalid("max requests must be positive"));
        }
        if window_ms > MAX_WINDOW_MS {
            return Err(GuardError::invalid(format!(
                "window must not exceed {MAX_WINDOW_MS} ms"
            )));
        }
        if max_requests > MAX_REQUESTS {
            return Err(GuardError::invalid(format!(
                "max requests must not exceed {MAX_REQUESTS}"
            )));
        }
        Ok(Self {
            window_ms,
            max_requests,
        })
    }

    pub fn per_seconds(max_requests: u32, window_secs: u64) -> Result<Self> {
        Self::new(window_secs.saturating_mul(1000), max_requests)
    }
}

/// Bounds on policies that callers of the check endpoint may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyCaps {
    pub max_window_ms: u64,
    pub max_requests: u32,
}

impl Default for PolicyCaps {
    fn default() -> Self {
        Self {
            max_window_ms: MAX_WINDOW_MS,
            max_requests: MAX_REQUESTS,
        }
    }
}

impl PolicyCaps {
    pub fn check(&self, policy: RateLimitPolicy) -> Result<RateLimitPolicy> {
        if policy.window_ms > self.max_window_ms {
            return Err(GuardError::invalid(format!(
                "window must not exceed {} ms",
                self.max_window_ms
            )));
        }
        if policy.max_requests > self.max_requests {
            return Err(GuardError::invalid(format!(
                "max requests must not exceed {}",
                self.max_requests
            )));
        }
        Ok(policy)
    }
}

/// Preset lookup used by the middleware. Categories without an explicit
/// preset fall back to the `default` one.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    default: RateLimitPolicy,
    presets: HashMap<ActionCategory, RateLimitPolicy>,
    caps: PolicyCaps,
}

impl PolicyTable {
    pub fn new(default: RateLimitPolicy) -> Self {
        Self {
            default,
            presets: HashMap::new(),
            caps: PolicyCaps::default(),
        }
    }

    pub fn with_caps(mut self, caps: PolicyCaps) -> Self {
        self.caps = caps;
        self
    }

    pub fn caps(&self) -> PolicyCaps {
        self.caps
    }

    pub fn with(mut self, action: ActionCategory, policy: RateLimitPolicy) -> Self {
        if action == ActionCategory::Default {
            self.default = policy;
        } else {
            self.presets.insert(action, policy);
        }
        self
    }

    pub fn get(&self, action: ActionCategory) -> RateLimitPolicy {
        self.presets.get(&action).copied().unwrap_or(self.default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Wallet,
    Ip,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Wallet => "wallet",
            Scope::Ip => "ip",
        }
    }
}

/// Composite `scope:action:subject` key, e.g. `wallet:purchase:0xabc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    scope: Scope,
    action: ActionCategory,
    subject: String,
}

impl RateLimitKey {
    pub fn new(scope: Scope, action: ActionCategory, subject: &str) -> Result<Self> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(GuardError::invalid("rate limit subject must not be empty"));
        }
        let subject = match scope {
            // addresses are case-insensitive hex
            Scope::Wallet => subject.to_ascii_lowercase(),
            Scope::Ip => subject.to_string(),
        };
        Ok(Self {
            scope,
            action,
            subject,
        })
    }

    pub fn wallet(action: ActionCategory, address: &str) -> Result<Self> {
        Self::new(Scope::Wallet, action, address)
    }

    pub fn ip(action: ActionCategory, ip: &str) -> Result<Self> {
        Self::new(Scope::Ip, action, ip)
    }

    pub fn action(&self) -> ActionCategory {
        self.action
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.scope.as_str(), self.action, self.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_window_or_quota_rejected() {
        assert!(matches!(
            RateLimitPolicy::new(0, 5),
            Err(GuardError::InvalidArgument(_))
        ));
        assert!(matches!(
            RateLimitPolicy::new(1_000, 0),
            Err(GuardError::InvalidArgument(_))
        ));
        assert_eq!(
            RateLimitPolicy::per_seconds(5, 60).unwrap(),
            RateLimitPolicy {
                window_ms: 60_000,
                max_requests: 5
            }
        );
    }

    #[test]
    fn oversized_window_or_quota_rejected() {
        assert!(matches!(
            RateLimitPolicy::new(u64::MAX, 1),
            Err(GuardError::InvalidArgument(_))
        ));
        assert!(RateLimitPolicy::new(MAX_WINDOW_MS, 1).is_ok());
        assert!(RateLimitPolicy::new(MAX_WINDOW_MS + 1, 1).is_err());
        assert!(RateLimitPolicy::new(60_000, MAX_REQUESTS + 1).is_err());
        assert!(RateLimitPolicy::per_seconds(1, u64::MAX).is_err());
    }

    #[test]
    fn caps_bound_caller_policies() {
        let caps = PolicyCaps {
            max_window_ms: 3_600_000,
            max_requests: 1_000,
        };
        let within = RateLimitPolicy::new(3_600_000, 1_000).unwrap();
        assert_eq!(caps.check(within).unwrap(), within);
        assert!(caps.check(RateLimitPolicy::new(3_600_001, 1).unwrap()).is_err());
        assert!(caps.check(RateLimitPolicy::new(60_000, 1_001).unwrap()).is_err());

        let table = PolicyTable::new(within).with_caps(caps);
        assert_eq!(table.caps(), caps);
        assert_eq!(PolicyTable::new(within).caps(), PolicyCaps::default());
    }

    #[test]
    fn table_falls_back_to_default() {
        let default = RateLimitPolicy::new(60_000, 10).unwrap();
        let purchase = RateLimitPolicy::new(60_000, 5).unwrap();
        let table = PolicyTable::new(default).with(ActionCategory::Purchase, purchase);

        assert_eq!(table.get(ActionCategory::Purchase), purchase);
        assert_eq!(table.get(ActionCategory::Refund), default);
    }

    #[test]
    fn key_renders_scope_action_subject() {
        let key = RateLimitKey::wallet(ActionCategory::Purchase, "0xABC").unwrap();
        assert_eq!(key.to_string(), "wallet:purchase:0xabc");

        let key = RateLimitKey::ip(ActionCategory::Read, " 10.0.0.7 ").unwrap();
        assert_eq!(key.to_string(), "ip:read:10.0.0.7");
    }

    #[test]
    fn empty_subject_rejected() {
        assert!(RateLimitKey::wallet(ActionCategory::Purchase, "   ").is_err());
    }

    #[test]
    fn action_round_trips_through_json_names() {
        let action: ActionCategory = serde_json::from_str("\"refund\"").unwrap();
        assert_eq!(action, ActionCategory::Refund);
        assert_eq!(action.as_str(), "refund");
    }
}
