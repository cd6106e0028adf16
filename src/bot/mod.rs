//! Bot and suspicious-activity heuristics.
//!
//! Every scorer here is a pure function over a caller-built
//! [`BotSignalBundle`]; nothing reads the environment directly. Browser facts
//! reach the bundle through an [`EnvironmentProbe`] adapter.

mod assessment;
mod interaction;
mod probe;
mod rules;
mod signals;
mod wallet;

pub use assessment::{Assessment, Verdict, assess};
pub use interaction::{InteractionQuality, InteractionReport, analyze_interaction_quality};
pub use probe::{ClientEnvironmentReport, EnvironmentProbe};
pub use rules::{BotDetectionResult, BotScorer, DEFAULT_BOT_THRESHOLD, SignalRule, score_signals};
pub use signals::{
    AutomationMarker, AutomationTool, BotSignalBundle, EnvironmentSignals, InteractionData,
    WalletBehavior,
};
pub use wallet::{WalletVerdict, validate_wallet_behavior};
