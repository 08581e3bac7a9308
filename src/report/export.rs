//! CSV export of the session history and batch runs.
//!
//! One flat record per row so the files open cleanly in spreadsheets.

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::analysis::batch::BatchReport;
use crate::history::ThreatHistory;
use crate::NetraResult;

#[derive(Debug, Serialize)]
struct HistoryCsvRecord<'a> {
    timestamp: String,
    location: &'a str,
    probability: f64,
    level: &'static str,
}

#[derive(Debug, Serialize)]
struct BatchCsvRecord<'a> {
    location: &'a str,
    state: &'a str,
    fume: f64,
    metal: f64,
    gpr: f64,
    ground_cv: f64,
    drone_cv: f64,
    disturbance: f64,
    thermal: f64,
    probability: f64,
    level: &'static str,
}

const HISTORY_HEADER: [&str; 4] = ["timestamp", "location", "probability", "level"];

const BATCH_HEADER: [&str; 11] = [
    "location",
    "state",
    "fume",
    "metal",
    "gpr",
    "ground_cv",
    "drone_cv",
    "disturbance",
    "thermal",
    "probability",
    "level",
];

/// Writer that never derives headers from the first record, so an empty
/// export still carries its header line.
fn headed_writer<W: Write>(writer: W, header: &[&str]) -> NetraResult<csv::Writer<W>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(header)?;
    Ok(wtr)
}

/// Write every history entry, oldest first.
pub fn write_history_csv<W: Write>(writer: W, history: &ThreatHistory) -> NetraResult<()> {
    let mut wtr = headed_writer(writer, &HISTORY_HEADER)?;
    for entry in history.entries() {
        wtr.serialize(HistoryCsvRecord {
            timestamp: entry.timestamp.to_rfc3339(),
            location: &entry.location,
            probability: entry.probability,
            level: entry.level.as_str(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one row per location with its sensor values.
pub fn write_batch_csv<W: Write>(writer: W, report: &BatchReport) -> NetraResult<()> {
    use crate::SensorKind::*;

    let mut wtr = headed_writer(writer, &BATCH_HEADER)?;
    for row in &report.rows {
        let s = &row.sensors;
        wtr.serialize(BatchCsvRecord {
            location: row.location,
            state: row.state,
            fume: s.get(Fume),
            metal: s.get(Metal),
            gpr: s.get(Gpr),
            ground_cv: s.get(GroundCv),
            drone_cv: s.get(DroneCv),
            disturbance: s.get(Disturbance),
            thermal: s.get(Thermal),
            probability: row.probability,
            level: row.level.as_str(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// History CSV as a string, for HTTP downloads.
pub fn history_csv_string(history: &ThreatHistory) -> NetraResult<String> {
    let mut buf = Vec::new();
    write_history_csv(&mut buf, history)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &[u8]) -> NetraResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    log::info!("[REPORT] Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}
