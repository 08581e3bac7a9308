//! # Sensor Weights
//!
//! Fixed contribution of each sensor channel to the base score. The weights
//! sum to 1.0, so a reading with every channel at 100 has a base of 100
//! before correlation bonuses.
//!
//! ```text
//! fume        0.20   metal       0.18   gpr     0.15
//! ground_cv   0.12   drone_cv    0.15
//! disturbance 0.10   thermal     0.10
//! ```

use serde::{Serialize, Serializer};
use serde::ser::SerializeMap;

use crate::{SensorKind, SensorReading};

/// Per-channel weights, indexed by [`SensorKind::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatWeights {
    weights: [f64; 7],
}

/// The one weight table the command center scores with.
pub const NETRA_WEIGHTS: ThreatWeights = ThreatWeights {
    weights: [0.20, 0.18, 0.15, 0.12, 0.15, 0.10, 0.10],
};

impl Default for ThreatWeights {
    fn default() -> Self {
        NETRA_WEIGHTS
    }
}

impl ThreatWeights {
    pub fn get(&self, kind: SensorKind) -> f64 {
        self.weights[kind.index()]
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Weighted contribution of each channel, canonical order.
    pub fn contributions(&self, reading: &SensorReading) -> [(SensorKind, f64); 7] {
        SensorKind::ALL.map(|kind| (kind, reading.get(kind) * self.get(kind)))
    }

    /// Sum of weighted contributions, accumulated in canonical order.
    pub fn base_score(&self, reading: &SensorReading) -> f64 {
        self.contributions(reading)
            .iter()
            .fold(0.0, |acc, (_, weighted)| acc + weighted)
    }
}

impl Serialize for ThreatWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SensorKind::ALL.len()))?;
        for kind in SensorKind::ALL {
            map.serialize_entry(kind.as_str(), &self.get(kind))?;
        }
        map.end()
    }
}
