use serde::Deserialize;

use crate::bot::{
    BotSignalBundle, ClientEnvironmentReport, EnvironmentSignals, InteractionData, WalletBehavior,
};
use crate::error::{GuardError, Result};
use crate::policy::{ActionCategory, PolicyTable, RateLimitPolicy};

/// Prefix for keys supplied through the check endpoint, keeping them apart
/// from the middleware's `wallet:`/`ip:` keys.
pub const EXTERNAL_KEY_PREFIX: &str = "ext:";

// POST /api/rate-limit/check
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitCheckRequest {
    pub key: String,
    #[serde(default)]
    pub action: Option<ActionCategory>,
    #[serde(default)]
    pub window_ms: Option<u64>,
    #[serde(default)]
    pub max_requests: Option<u32>,
}

impl RateLimitCheckRequest {
    pub fn action(&self) -> ActionCategory {
        self.action.unwrap_or(ActionCategory::Default)
    }

    pub fn namespaced_key(&self) -> String {
        format!("{EXTERNAL_KEY_PREFIX}{}", self.key.trim())
    }

    // Explicit window/quota override the action's preset, within the table's caps
    pub fn resolve_policy(&self, table: &PolicyTable) -> Result<RateLimitPolicy> {
        if self.key.trim().is_empty() {
            return Err(GuardError::invalid("key must not be empty"));
        }
        let preset = table.get(self.action());
        let policy = RateLimitPolicy::new(
            self.window_ms.unwrap_or(preset.window_ms),
            self.max_requests.unwrap_or(preset.max_requests),
        )?;
        table.caps().check(policy)
    }
}

// Body for the bot scoring and purchase assessment endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssessmentRequest {
    pub environment: ClientEnvironmentReport,
    pub interaction: InteractionData,
    pub wallet: WalletBehavior,
}

impl AssessmentRequest {
    pub fn into_bundle(self, user_agent_header: Option<&str>) -> BotSignalBundle {
        let report = self.environment.with_user_agent_fallback(user_agent_header);
        BotSignalBundle {
            environment: EnvironmentSignals::from_probe(&report),
            interaction: self.interaction,
            wallet: self.wallet,
        }
    }
}
