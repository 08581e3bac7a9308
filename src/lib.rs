//! # N.E.T.R.A. Command Center - Core Library
//!
//! Next-Gen Eye for Threat Recognition & Analysis.
//!
//! A demonstration command center for simulated threat sensors deployed at
//! ten fixed locations across North-East India. Rover and drone sensors
//! produce seven readings per analysis; the scorer fuses them into a single
//! 0-100 threat probability and a four-tier severity level.
//!
//! ## Layout
//! - [`scoring`] - the weighted fusion rule and level classification.
//! - [`sensors`] - where readings come from (manual controls, random batch).
//! - [`locations`] - the static location registry.
//! - [`history`] - the append-only session log of live analyses.
//! - [`analysis`] - live, batch and overview workflows.
//! - [`report`] - report building and CSV export.
//! - [`response`] - alert dispatch for severe results.
//! - [`dashboard`] - the JSON HTTP API.
//!
//! There is no real sensor integration and nothing is persisted beyond the
//! session history, alert log and explicitly requested exports.

pub mod analysis;
pub mod dashboard;
pub mod history;
pub mod locations;
pub mod report;
pub mod response;
pub mod scoring;
pub mod sensors;

use serde::{Deserialize, Serialize, Serializer};
use serde::ser::SerializeMap;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for the command center.
#[derive(Error, Debug)]
pub enum NetraError {
    #[error("Missing sensor reading: {0}")]
    MissingSensorKind(SensorKind),

    #[error("Unknown sensor kind: '{0}'")]
    UnknownSensorKind(String),

    #[error("Sensor {kind} out of range [0, 100]: {value}")]
    OutOfRangeInput { kind: SensorKind, value: f64 },

    #[error("Unknown location: '{0}'")]
    UnknownLocation(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Alert delivery failed: {0}")]
    Alert(String),

    #[error("Dashboard error: {0}")]
    Dashboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type NetraResult<T> = Result<T, NetraError>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Top-level configuration.
///
/// Loaded from `netra-command.toml` in the working directory or a path
/// supplied via CLI flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetraConfig {
    /// General settings.
    pub general: GeneralConfig,

    /// Scorer input handling.
    pub scoring: ScoringConfig,

    /// Random batch generator settings.
    pub batch: BatchConfig,

    /// Alert dispatch for severe live results.
    pub alerts: AlertConfig,

    /// Dashboard HTTP API.
    pub dashboard: DashboardConfig,

    /// Report and export output.
    pub reports: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Operator-facing name of the command center.
    pub station_name: String,

    /// Directory for alert logs, e-mail queue and exports.
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// What to do with readings outside [0, 100].
    pub input_policy: InputPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Inclusive lower bound of generated readings.
    pub min_value: u32,

    /// Exclusive upper bound of generated readings.
    pub max_value: u32,

    /// Fixed RNG seed for reproducible runs. None = seed from entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Master switch for alert dispatch.
    pub enabled: bool,

    /// Lowest level that raises an alert.
    pub min_level: ThreatLevel,

    /// JSONL alert log.
    pub alert_log_path: PathBuf,

    /// Optional webhook URL (http/https).
    pub webhook_url: Option<String>,

    /// Optional recipient for queued e-mail alerts.
    pub alert_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Bind address (e.g., "127.0.0.1").
    pub bind_address: String,

    /// Port to listen on.
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where `report` and `batch --csv` write files by default.
    pub output_dir: PathBuf,
}

impl Default for NetraConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig {
                station_name: "N.E.T.R.A. Command Center".to_string(),
                data_dir: PathBuf::from("./netra-data"),
            },
            scoring: ScoringConfig {
                input_policy: InputPolicy::Reject,
            },
            batch: BatchConfig {
                min_value: 10,
                max_value: 95,
                seed: None,
            },
            alerts: AlertConfig {
                enabled: true,
                min_level: ThreatLevel::Critical,
                alert_log_path: PathBuf::from("./netra-data/alerts.jsonl"),
                webhook_url: None,
                alert_email: None,
            },
            dashboard: DashboardConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8501,
            },
            reports: ReportConfig {
                output_dir: PathBuf::from("./netra-data/reports"),
            },
        }
    }
}

impl NetraConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> NetraResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NetraConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration to a TOML file.
    pub fn write_default(path: &std::path::Path) -> NetraResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| NetraError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the rest of the crate cannot honour.
    pub fn validate(&self) -> NetraResult<()> {
        if self.batch.min_value >= self.batch.max_value {
            return Err(NetraError::Config(format!(
                "batch.min_value ({}) must be below batch.max_value ({})",
                self.batch.min_value, self.batch.max_value
            )));
        }
        if self.batch.max_value > 101 {
            return Err(NetraError::Config(format!(
                "batch.max_value ({}) would generate readings above 100",
                self.batch.max_value
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// One of the seven sensor channels. Rover: fume, metal, gpr, ground_cv.
/// Drone: drone_cv, disturbance, thermal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Fume,
    Metal,
    Gpr,
    GroundCv,
    DroneCv,
    Disturbance,
    Thermal,
}

impl SensorKind {
    /// All kinds in canonical order.
    pub const ALL: [SensorKind; 7] = [
        SensorKind::Fume,
        SensorKind::Metal,
        SensorKind::Gpr,
        SensorKind::GroundCv,
        SensorKind::DroneCv,
        SensorKind::Disturbance,
        SensorKind::Thermal,
    ];

    /// Position in [`SensorKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire / config name.
    pub fn as_str(self) -> &'static str {
        match self {
            SensorKind::Fume => "fume",
            SensorKind::Metal => "metal",
            SensorKind::Gpr => "gpr",
            SensorKind::GroundCv => "ground_cv",
            SensorKind::DroneCv => "drone_cv",
            SensorKind::Disturbance => "disturbance",
            SensorKind::Thermal => "thermal",
        }
    }

    /// Human-facing control label.
    pub fn label(self) -> &'static str {
        match self {
            SensorKind::Fume => "Fume Sensor",
            SensorKind::Metal => "Metal Detector",
            SensorKind::Gpr => "GPR Sensor",
            SensorKind::GroundCv => "Ground Vision",
            SensorKind::DroneCv => "Drone Vision",
            SensorKind::Disturbance => "Soil Disturbance",
            SensorKind::Thermal => "Thermal Scan",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = NetraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| NetraError::UnknownSensorKind(s.to_string()))
    }
}

/// A full set of seven sensor values for one analysis.
///
/// Total over [`SensorKind`] by construction: partial maps are rejected
/// with [`NetraError::MissingSensorKind`] when the reading is built, so the
/// scorer never sees a hole. Values are not range-checked here; that is the
/// scorer's input policy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct SensorReading {
    values: [f64; 7],
}

impl SensorReading {
    /// Build a reading from values in canonical order.
    pub fn new(
        fume: f64,
        metal: f64,
        gpr: f64,
        ground_cv: f64,
        drone_cv: f64,
        disturbance: f64,
        thermal: f64,
    ) -> Self {
        Self {
            values: [fume, metal, gpr, ground_cv, drone_cv, disturbance, thermal],
        }
    }

    /// Every channel set to the same value.
    pub fn uniform(value: f64) -> Self {
        Self { values: [value; 7] }
    }

    /// Build from `(kind, value)` pairs. Later duplicates win.
    pub fn from_pairs<I>(pairs: I) -> NetraResult<Self>
    where
        I: IntoIterator<Item = (SensorKind, f64)>,
    {
        let mut slots: [Option<f64>; 7] = [None; 7];
        for (kind, value) in pairs {
            slots[kind.index()] = Some(value);
        }

        let mut values = [0.0; 7];
        for kind in SensorKind::ALL {
            values[kind.index()] = slots[kind.index()]
                .ok_or(NetraError::MissingSensorKind(kind))?;
        }
        Ok(Self { values })
    }

    /// Value for one channel.
    pub fn get(&self, kind: SensorKind) -> f64 {
        self.values[kind.index()]
    }

    /// Copy with one channel replaced.
    pub fn with(mut self, kind: SensorKind, value: f64) -> Self {
        self.values[kind.index()] = value;
        self
    }

    /// `(kind, value)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SensorKind, f64)> + '_ {
        SensorKind::ALL.into_iter().map(move |k| (k, self.values[k.index()]))
    }
}

impl TryFrom<BTreeMap<String, f64>> for SensorReading {
    type Error = NetraError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let pairs = map
            .into_iter()
            .map(|(name, value)| Ok((name.parse::<SensorKind>()?, value)))
            .collect::<NetraResult<Vec<_>>>()?;
        Self::from_pairs(pairs)
    }
}

impl Serialize for SensorReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SensorKind::ALL.len()))?;
        for (kind, value) in self.iter() {
            map.serialize_entry(kind.as_str(), &value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// How the scorer treats readings outside [0, 100].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    /// Fail with [`NetraError::OutOfRangeInput`].
    #[default]
    Reject,

    /// Clamp finite values into range.
    Clamp,
}

/// Severity tier derived from a probability.
///
/// Ordered by severity, so `level >= ThreatLevel::High` reads naturally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl ThreatLevel {
    /// Highest severity first, the order the dashboard lists them in.
    pub const DESCENDING: [ThreatLevel; 4] = [
        ThreatLevel::Critical,
        ThreatLevel::High,
        ThreatLevel::Moderate,
        ThreatLevel::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThreatLevel::Critical => "CRITICAL",
            ThreatLevel::High => "HIGH",
            ThreatLevel::Moderate => "MODERATE",
            ThreatLevel::Low => "LOW",
        }
    }

    /// Display color token. See [`scoring::scorer::display_token`].
    pub fn color(self) -> &'static str {
        scoring::scorer::display_token(self).color
    }

    /// Display icon. See [`scoring::scorer::display_token`].
    pub fn icon(self) -> &'static str {
        scoring::scorer::display_token(self).icon
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreatLevel {
    type Err = NetraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Ok(ThreatLevel::Critical),
            "HIGH" => Ok(ThreatLevel::High),
            "MODERATE" => Ok(ThreatLevel::Moderate),
            "LOW" => Ok(ThreatLevel::Low),
            other => Err(NetraError::Config(format!("Unknown threat level: '{}'", other))),
        }
    }
}

/// A computed threat probability and its level. Never re-derived.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ThreatScore {
    /// Probability in [0, 100], two decimals.
    pub probability: f64,

    /// Level classified from `probability`.
    pub level: ThreatLevel,
}

impl ThreatScore {
    /// Classify an already computed probability.
    pub fn from_probability(probability: f64) -> Self {
        Self {
            probability,
            level: scoring::scorer::classify_level(probability),
        }
    }

    pub fn color(&self) -> &'static str {
        self.level.color()
    }
}
