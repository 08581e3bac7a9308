//! # Correlation Bonuses
//!
//! Fixed point bonuses added on top of the weighted base when independent
//! sensors agree. Each rule fires on its own; one reading can trigger all
//! three, which is how a full-scale reading reaches 127 before the cap.
//!
//! | Rule             | Condition                            | Points |
//! |------------------|--------------------------------------|--------|
//! | Fume + metal     | fume > 70 and metal > 70             | +12    |
//! | Vision agreement | \|drone_cv - ground_cv\| < 15        | +8     |
//! | Thermal + fume   | thermal > 60 and fume > 60           | +7     |
//!
//! Vision agreement compares the two camera channels only. Two cameras that
//! both see nothing still agree, so an all-zero reading collects +8.

use serde::{Deserialize, Serialize};

use crate::{SensorKind, SensorReading};

/// One correlation rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationBonus {
    FumeMetal,
    VisionAgreement,
    ThermalFume,
}

impl CorrelationBonus {
    pub const ALL: [CorrelationBonus; 3] = [
        CorrelationBonus::FumeMetal,
        CorrelationBonus::VisionAgreement,
        CorrelationBonus::ThermalFume,
    ];

    /// Points this rule adds when it fires.
    pub fn points(self) -> f64 {
        match self {
            CorrelationBonus::FumeMetal => 12.0,
            CorrelationBonus::VisionAgreement => 8.0,
            CorrelationBonus::ThermalFume => 7.0,
        }
    }

    /// Whether the rule fires for `reading`. Comparisons are strict.
    pub fn applies(self, reading: &SensorReading) -> bool {
        let v = |k| reading.get(k);
        match self {
            CorrelationBonus::FumeMetal => {
                v(SensorKind::Fume) > 70.0 && v(SensorKind::Metal) > 70.0
            }
            CorrelationBonus::VisionAgreement => {
                (v(SensorKind::DroneCv) - v(SensorKind::GroundCv)).abs() < 15.0
            }
            CorrelationBonus::ThermalFume => {
                v(SensorKind::Thermal) > 60.0 && v(SensorKind::Fume) > 60.0
            }
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CorrelationBonus::FumeMetal => "fume and metal both above 70",
            CorrelationBonus::VisionAgreement => "drone and ground vision within 15",
            CorrelationBonus::ThermalFume => "thermal and fume both above 60",
        }
    }
}

/// Rules that fire for `reading`, in table order.
pub fn active_bonuses(reading: &SensorReading) -> Vec<CorrelationBonus> {
    CorrelationBonus::ALL
        .into_iter()
        .filter(|b| b.applies(reading))
        .collect()
}

/// Sum of points for every rule that fires.
pub fn total_bonus(reading: &SensorReading) -> f64 {
    active_bonuses(reading).iter().map(|b| b.points()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> SensorReading {
        // Cameras far apart so vision agreement stays off.
        SensorReading::uniform(0.0).with(SensorKind::DroneCv, 50.0)
    }

    #[test]
    fn test_no_bonus_for_quiet_reading() {
        assert!(active_bonuses(&quiet()).is_empty());
        assert_eq!(total_bonus(&quiet()), 0.0);
    }

    #[test]
    fn test_fume_metal_is_strict() {
        let at_edge = quiet().with(SensorKind::Fume, 70.0).with(SensorKind::Metal, 80.0);
        assert!(!CorrelationBonus::FumeMetal.applies(&at_edge));

        let above = at_edge.with(SensorKind::Fume, 70.5);
        assert!(CorrelationBonus::FumeMetal.applies(&above));
    }

    #[test]
    fn test_vision_agreement_boundary() {
        let gap_15 = SensorReading::uniform(0.0)
            .with(SensorKind::GroundCv, 40.0)
            .with(SensorKind::DroneCv, 55.0);
        assert!(!CorrelationBonus::VisionAgreement.applies(&gap_15));

        let gap_14 = gap_15.with(SensorKind::DroneCv, 54.0);
        assert!(CorrelationBonus::VisionAgreement.applies(&gap_14));

        // Symmetric in direction.
        let reversed = gap_14
            .with(SensorKind::GroundCv, 54.0)
            .with(SensorKind::DroneCv, 40.0);
        assert!(CorrelationBonus::VisionAgreement.applies(&reversed));
    }

    #[test]
    fn test_all_zero_collects_vision_bonus() {
        let zero = SensorReading::uniform(0.0);
        assert_eq!(active_bonuses(&zero), vec![CorrelationBonus::VisionAgreement]);
        assert_eq!(total_bonus(&zero), 8.0);
    }

    #[test]
    fn test_bonuses_stack() {
        let full = SensorReading::uniform(100.0);
        assert_eq!(active_bonuses(&full).len(), 3);
        assert_eq!(total_bonus(&full), 27.0);
    }

    #[test]
    fn test_thermal_fume_independent_of_metal() {
        let r = quiet().with(SensorKind::Thermal, 61.0).with(SensorKind::Fume, 61.0);
        assert_eq!(active_bonuses(&r), vec![CorrelationBonus::ThermalFume]);
    }
}
