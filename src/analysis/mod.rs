//! # Analysis Workflows
//!
//! Ties the scorer to locations and the session history.
//!
//! - **Live analysis**: one location, operator-set readings. The result is
//!   appended to the history and may raise an alert.
//! - **Batch analysis** ([`batch`]): every location, random readings.
//!   Results are returned, never recorded.
//! - **Overview** ([`overview`]): headline numbers and chart series for the
//!   landing page.
//!
//! [`Session`] owns everything one operator session needs. It is the
//! single owner of the history; everything else borrows it.

pub mod batch;
pub mod overview;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde::Serialize;

use crate::history::{ThreatHistory, ThreatHistoryEntry};
use crate::locations::{LocationRecord, LocationRegistry};
use crate::response::AlertDispatcher;
use crate::scoring::{ScoreBreakdown, ThreatScorer};
use crate::sensors::{session_rng, RandomSensors};
use crate::{BatchConfig, NetraConfig, NetraResult, SensorReading, ThreatLevel, ThreatScore};

use batch::BatchReport;
use overview::Overview;

/// Result of one live analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub timestamp: DateTime<Utc>,
    pub location: LocationRecord,
    pub sensors: SensorReading,
    pub score: ThreatScore,
    pub color: &'static str,
    pub breakdown: ScoreBreakdown,
}

impl AnalysisReport {
    pub fn summary(&self) -> String {
        format!(
            "{} | {} | {:.1}% {}",
            self.location.name,
            self.location.state,
            self.score.probability,
            self.score.level,
        )
    }
}

/// Score `reading` for the location `key` and record it.
pub fn analyze_location(
    scorer: &ThreatScorer,
    registry: &LocationRegistry,
    history: &mut ThreatHistory,
    key: &str,
    reading: &SensorReading,
) -> NetraResult<AnalysisReport> {
    analyze_location_at(scorer, registry, history, key, reading, Utc::now())
}

/// [`analyze_location`] with an explicit timestamp.
pub fn analyze_location_at(
    scorer: &ThreatScorer,
    registry: &LocationRegistry,
    history: &mut ThreatHistory,
    key: &str,
    reading: &SensorReading,
    timestamp: DateTime<Utc>,
) -> NetraResult<AnalysisReport> {
    let location = registry.lookup(key)?;
    let breakdown = scorer.breakdown(reading)?;
    let score = ThreatScore {
        probability: breakdown.probability,
        level: breakdown.level,
    };

    history.append(ThreatHistoryEntry::new(timestamp, location.name, &score));

    log::info!(
        "[ANALYSIS] {} ({}) -> {:.2}% {}",
        location.name,
        location.state,
        score.probability,
        score.level,
    );

    Ok(AnalysisReport {
        timestamp,
        location: *location,
        sensors: *reading,
        score,
        color: score.color(),
        breakdown,
    })
}

/// Occurrences of each level, all four listed highest first.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LevelCount {
    pub level: ThreatLevel,
    pub color: &'static str,
    pub count: usize,
}

/// Zero-filled level distribution.
pub fn level_distribution<I>(levels: I) -> Vec<LevelCount>
where
    I: IntoIterator<Item = ThreatLevel>,
{
    let mut counts = [0usize; 4];
    for level in levels {
        counts[level as usize] += 1;
    }
    ThreatLevel::DESCENDING
        .into_iter()
        .map(|level| LevelCount {
            level,
            color: level.color(),
            count: counts[level as usize],
        })
        .collect()
}

/// One operator session: scorer, registry, history, RNG and alerts.
pub struct Session {
    scorer: ThreatScorer,
    registry: LocationRegistry,
    history: ThreatHistory,
    rng: StdRng,
    batch: BatchConfig,
    station_name: String,
    alerts: Option<AlertDispatcher>,
}

impl Session {
    pub fn new(config: &NetraConfig) -> Self {
        let alerts = config
            .alerts
            .enabled
            .then(|| AlertDispatcher::new(&config.alerts));
        Self {
            scorer: ThreatScorer::from_config(&config.scoring),
            registry: LocationRegistry::north_east(),
            history: ThreatHistory::new(),
            rng: session_rng(config.batch.seed),
            batch: config.batch.clone(),
            station_name: config.general.station_name.clone(),
            alerts,
        }
    }

    /// Replace the RNG, e.g. with a seeded one in tests.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn scorer(&self) -> &ThreatScorer {
        &self.scorer
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    pub fn history(&self) -> &ThreatHistory {
        &self.history
    }

    pub fn alerts(&self) -> Option<&AlertDispatcher> {
        self.alerts.as_ref()
    }

    /// Live analysis: score, record, alert.
    pub fn analyze(&mut self, key: &str, reading: &SensorReading) -> NetraResult<AnalysisReport> {
        let report = analyze_location(
            &self.scorer,
            &self.registry,
            &mut self.history,
            key,
            reading,
        )?;
        if let Some(alerts) = self.alerts.as_mut() {
            alerts.notify(&report);
        }
        Ok(report)
    }

    /// Batch analysis over every location with fresh random readings.
    pub fn run_batch(&mut self, progress: impl FnMut(usize, usize)) -> NetraResult<BatchReport> {
        let mut source = RandomSensors::from_config(&mut self.rng, &self.batch);
        batch::run_batch(&self.scorer, &self.registry, &mut source, progress)
    }

    pub fn overview(&mut self) -> Overview {
        overview::build_overview(
            &self.station_name,
            &self.registry,
            &self.history,
            &mut self.rng,
        )
    }

    pub fn map_markers(&mut self) -> Vec<crate::dashboard::map::MapMarker> {
        crate::dashboard::map::build_markers(&self.registry, &self.history, &mut self.rng)
    }
}
