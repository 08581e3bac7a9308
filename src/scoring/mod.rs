//! # Threat Scorer
//!
//! Wraps the pure scoring functions with the input policy from
//! configuration. Every caller (live analysis, batch runs, the dashboard
//! API) goes through [`ThreatScorer`] so out-of-range readings are handled
//! the same way everywhere.
//!
//! The scorer holds no per-request state. One instance can score any
//! number of readings in any order.

pub mod correlation;
pub mod scorer;
pub mod weights;

use serde::Serialize;

use crate::{
    InputPolicy, NetraError, NetraResult, ScoringConfig, SensorKind, SensorReading,
    ThreatLevel, ThreatScore,
};
use correlation::CorrelationBonus;
use weights::{ThreatWeights, NETRA_WEIGHTS};

/// Stateless scorer with a fixed weight table and an input policy.
#[derive(Debug, Clone, Copy)]
pub struct ThreatScorer {
    weights: ThreatWeights,
    policy: InputPolicy,
}

/// One channel's share of the base score.
#[derive(Debug, Clone, Serialize)]
pub struct Contribution {
    pub sensor: SensorKind,
    pub value: f64,
    pub weight: f64,
    pub weighted: f64,
}

/// A bonus rule that fired.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedBonus {
    pub rule: CorrelationBonus,
    pub points: f64,
    pub description: &'static str,
}

/// Full working of a single score, for display and reports.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub contributions: Vec<Contribution>,
    pub base: f64,
    pub bonuses: Vec<AppliedBonus>,
    pub bonus_total: f64,
    /// Base plus bonuses, before rounding and the cap.
    pub uncapped: f64,
    pub probability: f64,
    pub level: ThreatLevel,
}

impl Default for ThreatScorer {
    fn default() -> Self {
        Self::new(InputPolicy::default())
    }
}

impl ThreatScorer {
    pub fn new(policy: InputPolicy) -> Self {
        Self {
            weights: NETRA_WEIGHTS,
            policy,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.input_policy)
    }

    pub fn policy(&self) -> InputPolicy {
        self.policy
    }

    pub fn weights(&self) -> &ThreatWeights {
        &self.weights
    }

    /// Apply the input policy. Non-finite values always fail.
    pub fn prepare(&self, reading: &SensorReading) -> NetraResult<SensorReading> {
        let mut prepared = *reading;
        for (kind, value) in reading.iter() {
            if !value.is_finite() {
                return Err(NetraError::OutOfRangeInput { kind, value });
            }
            if (0.0..=100.0).contains(&value) {
                continue;
            }
            match self.policy {
                InputPolicy::Reject => {
                    return Err(NetraError::OutOfRangeInput { kind, value });
                }
                InputPolicy::Clamp => {
                    log::debug!("[SCORER] Clamping {}={} into [0, 100]", kind, value);
                    prepared = prepared.with(kind, value.clamp(0.0, 100.0));
                }
            }
        }
        Ok(prepared)
    }

    /// Probability only.
    pub fn probability(&self, reading: &SensorReading) -> NetraResult<f64> {
        let prepared = self.prepare(reading)?;
        Ok(scorer::compute_probability_with(&prepared, &self.weights))
    }

    /// Probability and level.
    pub fn score(&self, reading: &SensorReading) -> NetraResult<ThreatScore> {
        let score = ThreatScore::from_probability(self.probability(reading)?);
        log::debug!("[SCORER] {}", scorer::format_score(&score));
        Ok(score)
    }

    /// Probability, level and every intermediate term.
    pub fn breakdown(&self, reading: &SensorReading) -> NetraResult<ScoreBreakdown> {
        let prepared = self.prepare(reading)?;

        let contributions: Vec<Contribution> = self
            .weights
            .contributions(&prepared)
            .into_iter()
            .map(|(sensor, weighted)| Contribution {
                sensor,
                value: prepared.get(sensor),
                weight: self.weights.get(sensor),
                weighted,
            })
            .collect();

        let bonuses: Vec<AppliedBonus> = correlation::active_bonuses(&prepared)
            .into_iter()
            .map(|rule| AppliedBonus {
                rule,
                points: rule.points(),
                description: rule.description(),
            })
            .collect();

        let base = self.weights.base_score(&prepared);
        let bonus_total: f64 = bonuses.iter().map(|b| b.points).sum();
        let probability = scorer::compute_probability_with(&prepared, &self.weights);

        Ok(ScoreBreakdown {
            contributions,
            base,
            bonuses,
            bonus_total,
            uncapped: base + bonus_total,
            probability,
            level: scorer::classify_level(probability),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_policy_refuses_out_of_range() {
        let scorer = ThreatScorer::new(InputPolicy::Reject);
        let reading = SensorReading::uniform(50.0).with(SensorKind::Gpr, 120.0);
        match scorer.score(&reading) {
            Err(NetraError::OutOfRangeInput { kind, value }) => {
                assert_eq!(kind, SensorKind::Gpr);
                assert_eq!(value, 120.0);
            }
            other => panic!("expected out of range, got {:?}", other),
        }
    }

    #[test]
    fn test_clamp_policy_clamps() {
        let scorer = ThreatScorer::new(InputPolicy::Clamp);
        let over = SensorReading::uniform(150.0);
        let under = SensorReading::uniform(-20.0);
        assert_eq!(scorer.probability(&over).unwrap(), 100.0);
        // Clamped to all zero: only the camera agreement bonus.
        assert_eq!(scorer.probability(&under).unwrap(), 8.0);
    }

    #[test]
    fn test_non_finite_always_rejected() {
        let scorer = ThreatScorer::new(InputPolicy::Clamp);
        let reading = SensorReading::uniform(10.0).with(SensorKind::Thermal, f64::NAN);
        assert!(scorer.score(&reading).is_err());
    }

    #[test]
    fn test_boundary_values_accepted() {
        let scorer = ThreatScorer::default();
        assert!(scorer.score(&SensorReading::uniform(0.0)).is_ok());
        assert!(scorer.score(&SensorReading::uniform(100.0)).is_ok());
    }

    #[test]
    fn test_breakdown_matches_score() {
        let scorer = ThreatScorer::default();
        let reading = SensorReading::new(65.0, 65.0, 65.0, 50.0, 60.0, 65.0, 65.0);
        let breakdown = scorer.breakdown(&reading).unwrap();
        let score = scorer.score(&reading).unwrap();

        assert_eq!(breakdown.probability, score.probability);
        assert_eq!(breakdown.level, score.level);
        assert_eq!(breakdown.contributions.len(), 7);
        assert!((breakdown.base - 62.45).abs() < 1e-9);
        assert_eq!(breakdown.bonus_total, 15.0);
        assert_eq!(breakdown.bonuses.len(), 2);
    }

    #[test]
    fn test_breakdown_reports_uncapped_total() {
        let breakdown = ThreatScorer::default()
            .breakdown(&SensorReading::uniform(100.0))
            .unwrap();
        assert!((breakdown.uncapped - 127.0).abs() < 1e-9);
        assert_eq!(breakdown.probability, 100.0);
    }
}
