use serde::Serialize;

use super::interaction::{InteractionQuality, InteractionReport, analyze_interaction_quality};
use super::rules::{BotDetectionResult, BotScorer};
use super::signals::BotSignalBundle;
use super::wallet::{WalletVerdict, validate_wallet_behavior};

/// What the purchase flow should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    /// Ask for a CAPTCHA-style verification token before continuing.
    Challenge,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub verdict: Verdict,
    pub bot: BotDetectionResult,
    pub interaction: InteractionReport,
    pub wallet: WalletVerdict,
}

/// Runs all three scorers over one bundle and folds them into a verdict.
pub fn assess(bundle: &BotSignalBundle, scorer: &BotScorer) -> Assessment {
    let bot = scorer.score(bundle);
    let interaction = analyze_interaction_quality(&bundle.interaction);
    let wallet = validate_wallet_behavior(&bundle.wallet);

    let verdict = if bot.is_bot || wallet.suspicious {
        Verdict::Block
    } else if interaction.quality == InteractionQuality::Suspicious {
        Verdict::Challenge
    } else {
        Verdict::Allow
    };

    Assessment {
        verdict,
        bot,
        interaction,
        wallet,
    }
}
