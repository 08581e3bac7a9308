//! # Threat History
//!
//! Append-only log of live analyses for one operator session. Entries are
//! never edited or removed; the log is dropped with the session that owns
//! it. Batch runs do not write here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{ThreatLevel, ThreatScore};

/// One recorded live analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreatHistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// Location display name.
    pub location: String,
    pub probability: f64,
    pub level: ThreatLevel,
}

impl ThreatHistoryEntry {
    pub fn new(timestamp: DateTime<Utc>, location: &str, score: &ThreatScore) -> Self {
        Self {
            timestamp,
            location: location.to_string(),
            probability: score.probability,
            level: score.level,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Unbounded, ordered, append-only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThreatHistory {
    entries: Vec<ThreatHistoryEntry>,
}

impl ThreatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The only way to add to the log.
    pub fn append(&mut self, entry: ThreatHistoryEntry) {
        log::debug!(
            "[HISTORY] #{} {} {:.2}% {}",
            self.entries.len() + 1,
            entry.location,
            entry.probability,
            entry.level,
        );
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[ThreatHistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&ThreatHistoryEntry> {
        self.entries.last()
    }

    /// Most recent entry for a location display name.
    pub fn latest_for(&self, location: &str) -> Option<&ThreatHistoryEntry> {
        self.entries.iter().rev().find(|e| e.location == location)
    }

    /// Entries whose UTC date falls in `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&ThreatHistoryEntry> {
        self.entries
            .iter()
            .filter(|e| (start..=end).contains(&e.date()))
            .collect()
    }

    pub fn count_at_least(&self, level: ThreatLevel) -> usize {
        self.entries.iter().filter(|e| e.level >= level).count()
    }
}
