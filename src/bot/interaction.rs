use serde::Serialize;

use super::signals::InteractionData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionQuality {
    High,
    Medium,
    Low,
    Suspicious,
}

impl InteractionQuality {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => InteractionQuality::High,
            50..=79 => InteractionQuality::Medium,
            20..=49 => InteractionQuality::Low,
            _ => InteractionQuality::Suspicious,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InteractionReport {
    pub quality: InteractionQuality,
    pub score: u32,
}

// (exclusive lower bound, points); highest tier listed first
const MOUSE_TIERS: &[(u32, u32)] = &[(50, 25), (20, 15), (5, 5)];
const CLICK_TIERS: &[(u32, u32)] = &[(10, 20), (5, 10)];
const SCROLL_TIERS: &[(u32, u32)] = &[(10, 20), (3, 10)];
const KEY_TIERS: &[(u32, u32)] = &[(20, 20), (5, 10)];

fn tier_points(value: u32, tiers: &[(u32, u32)]) -> u32 {
    tiers
        .iter()
        .find(|(above, _)| value > *above)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

fn session_points(duration_ms: u64) -> u32 {
    let secs = duration_ms as f64 / 1000.0;
    if secs > 10.0 && secs < 3600.0 {
        15
    } else if secs > 5.0 {
        5
    } else {
        0
    }
}

/// Grades how human a session's interaction counters look, 0-100.
pub fn analyze_interaction_quality(data: &InteractionData) -> InteractionReport {
    let score = tier_points(data.mouse_movements, MOUSE_TIERS)
        + tier_points(data.clicks, CLICK_TIERS)
        + tier_points(data.scroll_events, SCROLL_TIERS)
        + tier_points(data.key_presses, KEY_TIERS)
        + session_points(data.session_duration);
    let score = score.min(100);

    InteractionReport {
        quality: InteractionQuality::from_score(score),
        score,
    }
}
