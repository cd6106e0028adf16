use serde::Serialize;

use super::signals::BotSignalBundle;

pub const DEFAULT_BOT_THRESHOLD: u32 = 50;

const BOT_UA_PATTERNS: &[&str] = &["bot", "crawler", "spider", "scraper"];

/// One additive heuristic: if `evaluate` yields any reasons, `points` are
/// added once and every reason is reported.
#[derive(Debug, Clone, Copy)]
pub struct SignalRule {
    pub name: &'static str,
    pub points: u32,
    pub evaluate: fn(&BotSignalBundle) -> Vec<&'static str>,
}

impl SignalRule {
    pub fn apply(&self, bundle: &BotSignalBundle) -> Option<(u32, Vec<&'static str>)> {
        let reasons = (self.evaluate)(bundle);
        if reasons.is_empty() {
            None
        } else {
            Some((self.points, reasons))
        }
    }
}

fn automation_markers(b: &BotSignalBundle) -> Vec<&'static str> {
    let mut markers = b.environment.automation_markers.clone();
    markers.sort();
    markers.dedup();
    markers.iter().map(|m| m.reason()).collect()
}

fn automation_tools(b: &BotSignalBundle) -> Vec<&'static str> {
    let mut tools = b.environment.automation_tools.clone();
    tools.sort();
    tools.dedup();
    tools.iter().map(|t| t.reason()).collect()
}

fn bot_user_agent(b: &BotSignalBundle) -> Vec<&'static str> {
    let ua = b.environment.user_agent.to_ascii_lowercase();
    if BOT_UA_PATTERNS.iter().any(|p| ua.contains(p)) {
        vec!["Bot detected in user agent"]
    } else {
        Vec::new()
    }
}

fn chrome_without_runtime(b: &BotSignalBundle) -> Vec<&'static str> {
    let env = &b.environment;
    if env.user_agent.contains("Chrome") && !env.has_chrome_runtime {
        vec!["Chrome user agent without chrome runtime"]
    } else {
        Vec::new()
    }
}

fn no_languages(b: &BotSignalBundle) -> Vec<&'static str> {
    if b.environment.language_count == 0 {
        vec!["No browser languages declared"]
    } else {
        Vec::new()
    }
}

fn focus_visibility_mismatch(b: &BotSignalBundle) -> Vec<&'static str> {
    if b.environment.document_hidden && b.environment.has_focus {
        vec!["Page hidden while reporting focus"]
    } else {
        Vec::new()
    }
}

pub fn default_rules() -> Vec<SignalRule> {
    vec![
        SignalRule {
            name: "automation_markers",
            points: 40,
            evaluate: automation_markers,
        },
        SignalRule {
            name: "automation_tools",
            points: 40,
            evaluate: automation_tools,
        },
        SignalRule {
            name: "bot_user_agent",
            points: 10,
            evaluate: bot_user_agent,
        },
        SignalRule {
            name: "chrome_without_runtime",
            points: 5,
            evaluate: chrome_without_runtime,
        },
        SignalRule {
            name: "no_languages",
            points: 5,
            evaluate: no_languages,
        },
        SignalRule {
            name: "focus_visibility_mismatch",
            points: 5,
            evaluate: focus_visibility_mismatch,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotDetectionResult {
    pub is_bot: bool,
    pub confidence: u32,
    pub reasons: Vec<String>,
    pub score: u32,
}

impl BotDetectionResult {
    pub fn from_score(score: u32, reasons: Vec<String>, threshold: u32) -> Self {
        let confidence = score.min(100);
        Self {
            is_bot: confidence >= threshold,
            confidence,
            reasons,
            score,
        }
    }
}

/// Ordered rule list plus the bot cut-off. Reasons come out in rule order.
#[derive(Debug, Clone)]
pub struct BotScorer {
    rules: Vec<SignalRule>,
    threshold: u32,
}

impl Default for BotScorer {
    fn default() -> Self {
        Self::new(default_rules(), DEFAULT_BOT_THRESHOLD)
    }
}

impl BotScorer {
    pub fn new(rules: Vec<SignalRule>, threshold: u32) -> Self {
        Self { rules, threshold }
    }

    pub fn with_threshold(threshold: u32) -> Self {
        Self::new(default_rules(), threshold)
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn rules(&self) -> &[SignalRule] {
        &self.rules
    }

    pub fn score(&self, bundle: &BotSignalBundle) -> BotDetectionResult {
        let mut score = 0u32;
        let mut reasons = Vec::new();
        for rule in &self.rules {
            if let Some((points, found)) = rule.apply(bundle) {
                score = score.saturating_add(points);
                reasons.extend(found.into_iter().map(String::from));
            }
        }
        BotDetectionResult::from_score(score, reasons, self.threshold)
    }
}

pub fn score_signals(bundle: &BotSignalBundle) -> BotDetectionResult {
    BotScorer::default().score(bundle)
}
