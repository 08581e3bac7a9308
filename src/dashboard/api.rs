//! # Dashboard API Handlers
//!
//! Request routing for the dashboard. Transport-agnostic: the HTTP server
//! feeds method, URL and body in and writes the [`ApiResponse`] back out,
//! and tests call [`route`] directly.
//!
//! ## Endpoints
//! - `GET  /health`       -> `{"status":"ok"}`
//! - `GET  /locations`    -> location registry
//! - `GET  /overview`     -> headline numbers, distribution, timeline
//! - `POST /analyze`      -> live analysis (body: `{"location": key, "sensors": {...}}`)
//! - `POST /batch`        -> batch analysis over every location
//! - `GET  /history`      -> session history (JSON)
//! - `GET  /history.csv`  -> session history (CSV)
//! - `GET  /map`          -> map center and markers
//! - `GET  /report?kind=..&start=YYYY-MM-DD&end=YYYY-MM-DD` -> report

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::map::MapView;
use crate::analysis::Session;
use crate::report::{build_report, export, ReportKind};
use crate::{NetraError, NetraResult, SensorReading};

/// Response produced by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => Self::error(500, &format!("Serialization failed: {}", e)),
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: serde_json::json!({ "ok": false, "error": message }).to_string(),
        }
    }

    fn csv(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/csv; charset=utf-8",
            body,
        }
    }

    fn from_error(err: &NetraError) -> Self {
        let status = match err {
            NetraError::MissingSensorKind(_)
            | NetraError::UnknownSensorKind(_)
            | NetraError::OutOfRangeInput { .. }
            | NetraError::InvalidDateRange { .. }
            | NetraError::Report(_)
            | NetraError::Json(_) => 400,
            NetraError::UnknownLocation(_) => 404,
            _ => 500,
        };
        Self::error(status, &err.to_string())
    }
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub location: String,
    pub sensors: SensorReading,
}

/// Dispatch one request.
pub fn route(session: &mut Session, method: &str, url: &str, body: &str) -> ApiResponse {
    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p, q),
        None => (url, ""),
    };

    let result = match (method, path) {
        ("GET", "/health") => Ok(ApiResponse::json(200, &serde_json::json!({ "status": "ok" }))),
        ("GET", "/locations") => Ok(ApiResponse::json(200, &session.registry().all())),
        ("GET", "/overview") => Ok(ApiResponse::json(200, &session.overview())),
        ("POST", "/analyze") => handle_analyze(session, body),
        ("POST", "/batch") => session
            .run_batch(|_, _| {})
            .map(|report| ApiResponse::json(200, &report)),
        ("GET", "/history") => Ok(ApiResponse::json(200, &session.history().entries())),
        ("GET", "/history.csv") => {
            export::history_csv_string(session.history()).map(ApiResponse::csv)
        }
        ("GET", "/map") => Ok(ApiResponse::json(200, &MapView::new(session.map_markers()))),
        ("GET", "/report") => handle_report(session, query),
        (_, "/health" | "/locations" | "/overview" | "/analyze" | "/batch" | "/history"
            | "/history.csv" | "/map" | "/report") => {
            Ok(ApiResponse::error(405, &format!("Method {} not allowed on {}", method, path)))
        }
        _ => Ok(ApiResponse::error(404, &format!("No route for {}", path))),
    };

    result.unwrap_or_else(|e| ApiResponse::from_error(&e))
}

fn handle_analyze(session: &mut Session, body: &str) -> NetraResult<ApiResponse> {
    let request: AnalyzeRequest = serde_json::from_str(body)?;
    let report = session.analyze(&request.location, &request.sensors)?;
    Ok(ApiResponse::json(200, &report))
}

fn handle_report(session: &Session, query: &str) -> NetraResult<ApiResponse> {
    let mut kind = ReportKind::ThreatAssessment;
    let mut start = None;
    let mut end = None;

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "kind" => kind = value.parse()?,
            "start" => start = Some(parse_date(value)?),
            "end" => end = Some(parse_date(value)?),
            _ => {}
        }
    }

    let today = chrono::Utc::now().date_naive();
    let end = end.unwrap_or(today);
    let start = start.unwrap_or(end);

    let report = build_report(kind, session.history(), start, end)?;
    Ok(ApiResponse::json(200, &report))
}

fn parse_date(value: &str) -> NetraResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| NetraError::Report(format!("Bad date '{}': {}", value, e)))
}
