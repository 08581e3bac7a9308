//! # Threat Probability Scorer
//!
//! The heart of the command center. Fuses seven sensor readings into a
//! single threat probability and classifies it into a severity level.
//!
//! ## Scoring Model
//!
//! ```text
//! base        = Σ reading[k] * weight[k]
//! probability = min(100, round(base + bonuses, 2))
//! ```
//!
//! Bonuses come from [`super::correlation`]. Both functions here are pure:
//! no state, no randomness, no I/O.
//!
//! ## Levels
//!
//! ```text
//! >= 75  CRITICAL
//! >= 50  HIGH
//! >= 25  MODERATE
//!  < 25  LOW
//! ```

use super::correlation;
use super::weights::{ThreatWeights, NETRA_WEIGHTS};
use crate::{SensorReading, ThreatLevel, ThreatScore};

/// Upper bound of any probability.
pub const MAX_PROBABILITY: f64 = 100.0;

/// Compute the threat probability with the standard weights.
///
/// Inputs are expected in [0, 100]; range checks belong to
/// [`super::ThreatScorer`]. The result is rounded to two decimals and
/// capped at 100.
pub fn compute_probability(reading: &SensorReading) -> f64 {
    compute_probability_with(reading, &NETRA_WEIGHTS)
}

/// Same as [`compute_probability`] with an explicit weight table.
pub fn compute_probability_with(reading: &SensorReading, weights: &ThreatWeights) -> f64 {
    let base = weights.base_score(reading);
    let bonus = correlation::total_bonus(reading);
    round2(base + bonus).min(MAX_PROBABILITY)
}

/// Map a probability to its level. Total: NaN falls through to LOW.
pub fn classify_level(probability: f64) -> ThreatLevel {
    match probability {
        p if p >= 75.0 => ThreatLevel::Critical,
        p if p >= 50.0 => ThreatLevel::High,
        p if p >= 25.0 => ThreatLevel::Moderate,
        _ => ThreatLevel::Low,
    }
}

/// Round to two decimal places from the exact binary value.
///
/// Decimal formatting is exact, so `7.925` (stored just below the half)
/// goes down to `7.92`. Scaling by 100 first would round it up.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Presentation tokens for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayToken {
    pub level: ThreatLevel,
    pub color: &'static str,
    pub icon: &'static str,
}

const DISPLAY_TOKENS: [DisplayToken; 4] = [
    DisplayToken { level: ThreatLevel::Critical, color: "#dc2626", icon: "🔴" },
    DisplayToken { level: ThreatLevel::High, color: "#f59e0b", icon: "🟡" },
    DisplayToken { level: ThreatLevel::Moderate, color: "#10b981", icon: "🟢" },
    DisplayToken { level: ThreatLevel::Low, color: "#3b82f6", icon: "⚪" },
];

/// Look up display tokens. Kept apart from [`classify_level`] so the
/// decision never depends on presentation.
pub fn display_token(level: ThreatLevel) -> DisplayToken {
    DISPLAY_TOKENS
        .iter()
        .copied()
        .find(|t| t.level == level)
        .unwrap_or(DISPLAY_TOKENS[3])
}

/// Format a score as a compact string for logging.
///
/// Example: "THREAT 77.45% 🔴 CRITICAL"
pub fn format_score(score: &ThreatScore) -> String {
    format!(
        "THREAT {:.2}% {} {}",
        score.probability,
        score.level.icon(),
        score.level,
    )
}
