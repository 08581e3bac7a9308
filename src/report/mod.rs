//! # Threat Reports
//!
//! Builds reports over the session history for a date range. Three kinds,
//! differing only in how entries are grouped:
//!
//! - `threat-assessment` - per location
//! - `daily-summary` - per UTC day
//! - `weekly-analysis` - per ISO week
//!
//! Reports render as JSON or plain text. Tabular exports live in
//! [`export`].

pub mod export;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::analysis::{level_distribution, LevelCount};
use crate::history::{ThreatHistory, ThreatHistoryEntry};
use crate::scoring::scorer::round2;
use crate::{NetraError, NetraResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    ThreatAssessment,
    DailySummary,
    WeeklyAnalysis,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::ThreatAssessment => "threat-assessment",
            ReportKind::DailySummary => "daily-summary",
            ReportKind::WeeklyAnalysis => "weekly-analysis",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::ThreatAssessment => "Threat Assessment",
            ReportKind::DailySummary => "Daily Summary",
            ReportKind::WeeklyAnalysis => "Weekly Analysis",
        }
    }

    fn group_key(self, entry: &ThreatHistoryEntry) -> String {
        match self {
            ReportKind::ThreatAssessment => entry.location.clone(),
            ReportKind::DailySummary => entry.date().format("%Y-%m-%d").to_string(),
            ReportKind::WeeklyAnalysis => {
                let week = entry.date().iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = NetraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "threat-assessment" => Ok(ReportKind::ThreatAssessment),
            "daily-summary" => Ok(ReportKind::DailySummary),
            "weekly-analysis" => Ok(ReportKind::WeeklyAnalysis),
            other => Err(NetraError::Report(format!(
                "Unknown report kind: '{}'. Valid: threat-assessment, daily-summary, weekly-analysis",
                other
            ))),
        }
    }
}

/// Aggregate for one group (location, day or week).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportGroup {
    pub label: String,
    pub count: usize,
    pub mean_probability: f64,
    pub peak_probability: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreatReport {
    pub kind: ReportKind,
    pub title: &'static str,
    pub generated_at: DateTime<Utc>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total: usize,
    pub mean_probability: Option<f64>,
    pub peak: Option<ThreatHistoryEntry>,
    pub level_counts: Vec<LevelCount>,
    pub groups: Vec<ReportGroup>,
    pub entries: Vec<ThreatHistoryEntry>,
}

/// Build a report from history entries dated within `[start, end]`.
pub fn build_report(
    kind: ReportKind,
    history: &ThreatHistory,
    start: NaiveDate,
    end: NaiveDate,
) -> NetraResult<ThreatReport> {
    if start > end {
        return Err(NetraError::InvalidDateRange { start, end });
    }

    let entries: Vec<ThreatHistoryEntry> =
        history.between(start, end).into_iter().cloned().collect();

    let mean_probability = if entries.is_empty() {
        None
    } else {
        let sum: f64 = entries.iter().map(|e| e.probability).sum();
        Some(round2(sum / entries.len() as f64))
    };

    let peak = entries
        .iter()
        .max_by(|a, b| a.probability.total_cmp(&b.probability))
        .cloned();

    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for entry in &entries {
        grouped
            .entry(kind.group_key(entry))
            .or_default()
            .push(entry.probability);
    }
    let groups = grouped
        .into_iter()
        .map(|(label, values)| ReportGroup {
            count: values.len(),
            mean_probability: round2(values.iter().sum::<f64>() / values.len() as f64),
            peak_probability: values.iter().copied().fold(f64::MIN, f64::max),
            label,
        })
        .collect();

    log::info!(
        "[REPORT] {} {}..{}: {} entries",
        kind.title(),
        start,
        end,
        entries.len(),
    );

    Ok(ThreatReport {
        kind,
        title: kind.title(),
        generated_at: Utc::now(),
        start,
        end,
        total: entries.len(),
        mean_probability,
        peak,
        level_counts: level_distribution(entries.iter().map(|e| e.level)),
        groups,
        entries,
    })
}

impl ThreatReport {
    /// Plain-text rendering for terminals and `.txt` downloads.
    pub fn render_text(&self, station: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} - {}", station, self.title);
        let _ = writeln!(out, "{}", "=".repeat(station.len() + self.title.len() + 3));
        let _ = writeln!(out, "Period:    {} to {}", self.start, self.end);
        let _ = writeln!(out, "Generated: {}", self.generated_at.to_rfc3339());
        let _ = writeln!(out, "Analyses:  {}", self.total);
        match self.mean_probability {
            Some(mean) => {
                let _ = writeln!(out, "Mean:      {:.2}%", mean);
            }
            None => {
                let _ = writeln!(out, "Mean:      n/a");
            }
        }
        if let Some(ref peak) = self.peak {
            let _ = writeln!(
                out,
                "Peak:      {:.2}% {} at {} ({})",
                peak.probability,
                peak.level,
                peak.location,
                peak.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Levels:");
        for c in &self.level_counts {
            let _ = writeln!(out, "  {:<9} {}", c.level.as_str(), c.count);
        }

        if !self.groups.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Breakdown:");
            for g in &self.groups {
                let _ = writeln!(
                    out,
                    "  {:<40} n={:<4} mean={:>6.2}% peak={:>6.2}%",
                    g.label, g.count, g.mean_probability, g.peak_probability,
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ThreatScore;
    use chrono::TimeZone;

    fn history() -> ThreatHistory {
        let mut h = ThreatHistory::new();
        let data = [
            (3, "Kohima NH-29, Nagaland", 80.0),
            (3, "Imphal City Center, Manipur", 20.0),
            (4, "Kohima NH-29, Nagaland", 60.0),
            (12, "Imphal City Center, Manipur", 40.0),
        ];
        for (day, loc, p) in data {
            let ts = Utc.with_ymd_and_hms(2025, 11, day, 9, 0, 0).unwrap();
            h.append(ThreatHistoryEntry::new(ts, loc, &ThreatScore::from_probability(p)));
        }
        h
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("daily-summary".parse::<ReportKind>().unwrap(), ReportKind::DailySummary);
        assert!("quarterly".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = build_report(ReportKind::DailySummary, &history(), date(5), date(1));
        assert!(matches!(result, Err(NetraError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_assessment_groups_by_location() {
        let report =
            build_report(ReportKind::ThreatAssessment, &history(), date(1), date(30)).unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.mean_probability, Some(50.0));
        assert_eq!(report.peak.as_ref().unwrap().probability, 80.0);
        assert_eq!(report.groups.len(), 2);
        let kohima = report.groups.iter().find(|g| g.label.starts_with("Kohima")).unwrap();
        assert_eq!(kohima.count, 2);
        assert_eq!(kohima.mean_probability, 70.0);
        assert_eq!(kohima.peak_probability, 80.0);
    }

    #[test]
    fn test_daily_summary_respects_range() {
        let report = build_report(ReportKind::DailySummary, &history(), date(3), date(4)).unwrap();
        assert_eq!(report.total, 3);
        let labels: Vec<_> = report.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["2025-11-03", "2025-11-04"]);
    }

    #[test]
    fn test_weekly_analysis_groups_by_iso_week() {
        let report =
            build_report(ReportKind::WeeklyAnalysis, &history(), date(1), date(30)).unwrap();
        let labels: Vec<_> = report.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["2025-W45", "2025-W46"]);
        assert_eq!(report.groups[0].count, 3);
    }

    #[test]
    fn test_empty_range() {
        let report = build_report(ReportKind::DailySummary, &history(), date(20), date(21)).unwrap();
        assert_eq!(report.total, 0);
        assert!(report.mean_probability.is_none());
        assert!(report.peak.is_none());
        assert!(report.render_text("NETRA").contains("n/a"));
    }

    #[test]
    fn test_render_text() {
        let report =
            build_report(ReportKind::ThreatAssessment, &history(), date(1), date(30)).unwrap();
        let text = report.render_text("N.E.T.R.A.");
        assert!(text.starts_with("N.E.T.R.A. - Threat Assessment"));
        assert!(text.contains("Peak:      80.00% CRITICAL at Kohima NH-29, Nagaland"));
        assert!(text.contains("CRITICAL  1"));
    }
}
