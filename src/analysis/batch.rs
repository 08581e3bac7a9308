//! # Batch Analysis
//!
//! Scores every registered location in one pass with readings drawn from a
//! [`SensorSource`], then aggregates the rows for the bar and pie charts.
//! Batch rows are a snapshot; they do not enter the session history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{level_distribution, LevelCount};
use crate::locations::LocationRegistry;
use crate::scoring::scorer::round2;
use crate::scoring::ThreatScorer;
use crate::sensors::SensorSource;
use crate::{NetraResult, SensorReading, ThreatLevel};

/// One scored location.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRow {
    pub key: &'static str,
    pub location: &'static str,
    pub state: &'static str,
    pub sensors: SensorReading,
    pub probability: f64,
    pub level: ThreatLevel,
}

/// Mean probability for one state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StateAverage {
    pub state: &'static str,
    pub locations: usize,
    pub mean_probability: f64,
}

/// All rows of one batch run, in registry order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub rows: Vec<BatchRow>,
}

impl BatchReport {
    /// Per-state means, sorted by state name.
    pub fn state_averages(&self) -> Vec<StateAverage> {
        let mut groups: BTreeMap<&'static str, (usize, f64)> = BTreeMap::new();
        for row in &self.rows {
            let slot = groups.entry(row.state).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 += row.probability;
        }
        groups
            .into_iter()
            .map(|(state, (locations, total))| StateAverage {
                state,
                locations,
                mean_probability: round2(total / locations as f64),
            })
            .collect()
    }

    pub fn level_counts(&self) -> Vec<LevelCount> {
        level_distribution(self.rows.iter().map(|r| r.level))
    }

    /// Bar chart series: (location, probability, level).
    pub fn by_location(&self) -> Vec<(&'static str, f64, ThreatLevel)> {
        self.rows
            .iter()
            .map(|r| (r.location, r.probability, r.level))
            .collect()
    }

    pub fn highest(&self) -> Option<&BatchRow> {
        self.rows
            .iter()
            .max_by(|a, b| a.probability.total_cmp(&b.probability))
    }
}

/// Score every location in `registry` with readings from `source`.
///
/// `progress` is called with `(done, total)` after each location.
pub fn run_batch(
    scorer: &ThreatScorer,
    registry: &LocationRegistry,
    source: &mut dyn SensorSource,
    mut progress: impl FnMut(usize, usize),
) -> NetraResult<BatchReport> {
    let total = registry.len();
    let mut rows = Vec::with_capacity(total);

    log::info!("[BATCH] Analyzing {} locations ({} sensors)", total, source.name());

    for (idx, location) in registry.iter().enumerate() {
        let sensors = source.read(location);
        let score = scorer.score(&sensors)?;

        rows.push(BatchRow {
            key: location.key,
            location: location.name,
            state: location.state,
            sensors,
            probability: score.probability,
            level: score.level,
        });

        progress(idx + 1, total);
    }

    let report = BatchReport {
        generated_at: Utc::now(),
        source: source.name().to_string(),
        rows,
    };

    if let Some(top) = report.highest() {
        log::info!(
            "[BATCH] Complete. Highest: {} {:.2}% {}",
            top.location,
            top.probability,
            top.level,
        );
    }

    Ok(report)
}
