//! Landing page aggregates: headline counts, the level distribution of the
//! session so far, and a simulated 24-hour threat timeline.

use rand::{Rng, RngCore};
use serde::Serialize;

use super::{level_distribution, LevelCount};
use crate::history::ThreatHistory;
use crate::locations::LocationRegistry;

/// One hour on the simulated timeline.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TimelinePoint {
    pub hour: u32,
    pub threat: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub station: String,
    pub active_locations: usize,
    pub threats_detected: usize,
    pub critical: usize,
    pub high: usize,
    pub distribution: Vec<LevelCount>,
    pub timeline: Vec<TimelinePoint>,
}

/// 24 points, `20 + r` with `r` uniform in [-10, 30).
pub fn simulated_timeline(rng: &mut dyn RngCore) -> Vec<TimelinePoint> {
    (0..24)
        .map(|hour| TimelinePoint {
            hour,
            threat: 20 + rng.gen_range(-10..30),
        })
        .collect()
}

pub fn build_overview(
    station: &str,
    registry: &LocationRegistry,
    history: &ThreatHistory,
    rng: &mut dyn RngCore,
) -> Overview {
    let distribution = level_distribution(history.entries().iter().map(|e| e.level));
    let count_of = |idx: usize| distribution.get(idx).map(|c| c.count).unwrap_or(0);

    Overview {
        station: station.to_string(),
        active_locations: registry.len(),
        threats_detected: history.len(),
        critical: count_of(0),
        high: count_of(1),
        timeline: simulated_timeline(rng),
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ThreatHistoryEntry;
    use crate::ThreatScore;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_timeline_shape_and_range() {
        let mut rng = StdRng::seed_from_u64(8);
        let timeline = simulated_timeline(&mut rng);
        assert_eq!(timeline.len(), 24);
        assert_eq!(timeline[23].hour, 23);
        assert!(timeline.iter().all(|p| (10..50).contains(&p.threat)));
    }

    #[test]
    fn test_overview_counts_history() {
        let mut history = ThreatHistory::new();
        for p in [90.0, 80.0, 60.0, 10.0] {
            history.append(ThreatHistoryEntry::new(
                Utc::now(),
                "Kohima NH-29, Nagaland",
                &ThreatScore::from_probability(p),
            ));
        }
        let mut rng = StdRng::seed_from_u64(1);
        let overview =
            build_overview("Test", &LocationRegistry::north_east(), &history, &mut rng);

        assert_eq!(overview.active_locations, 10);
        assert_eq!(overview.threats_detected, 4);
        assert_eq!(overview.critical, 2);
        assert_eq!(overview.high, 1);
        assert_eq!(overview.distribution[3].count, 1);
    }

    #[test]
    fn test_empty_session_overview() {
        let mut rng = StdRng::seed_from_u64(1);
        let overview = build_overview(
            "Test",
            &LocationRegistry::north_east(),
            &ThreatHistory::new(),
            &mut rng,
        );
        assert_eq!(overview.threats_detected, 0);
        assert!(overview.distribution.iter().all(|c| c.count == 0));
    }
}
