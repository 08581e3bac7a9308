//! # Alert Channels
//!
//! Delivers alerts for severe live analyses through:
//! - JSONL file alerts (always active, one JSON object per line)
//! - Webhook notifications (optional, via ureq HTTP POST)
//! - Email queue (optional, writes .eml files for external pickup)
//!
//! Every alert carries the timestamp (RFC 3339), location, state,
//! coordinates, probability, level and the sensor values that produced it.

use std::io::Write;
use std::path::Path;

use crate::analysis::AnalysisReport;
use crate::scoring::scorer;
use crate::{NetraError, NetraResult};

fn alert_payload(report: &AnalysisReport) -> serde_json::Value {
    serde_json::json!({
        "timestamp": report.timestamp.to_rfc3339(),
        "location_key": report.location.key,
        "location": report.location.name,
        "state": report.location.state,
        "lat": report.location.lat,
        "lon": report.location.lon,
        "probability": report.score.probability,
        "threat_level": report.score.level,
        "color": report.color,
        "sensors": report.sensors,
    })
}

/// Append an alert as a JSON line to the alert log.
///
/// Creates the file and parent directories if they don't exist.
pub fn log_alert(log_path: &Path, report: &AnalysisReport) -> NetraResult<()> {
    let json_line = serde_json::to_string(&alert_payload(report))?;

    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "{}", json_line)?;
    file.flush()?;

    log::warn!(
        "[ALERT] {} | {} | {}",
        report.timestamp.to_rfc3339(),
        report.location.name,
        scorer::format_score(&report.score),
    );

    Ok(())
}

/// Only plain http(s) URLs are accepted.
pub fn validate_webhook_url(webhook_url: &str) -> NetraResult<()> {
    if !webhook_url.starts_with("https://") && !webhook_url.starts_with("http://") {
        return Err(NetraError::Alert(format!(
            "Webhook URL must start with http:// or https://, got: {}",
            webhook_url
        )));
    }
    Ok(())
}

/// POST the alert as JSON. 5 second timeout.
///
/// A bad URL or a failed POST is an error. The dispatcher records it as
/// undelivered and carries on.
pub fn send_webhook(webhook_url: &str, report: &AnalysisReport) -> NetraResult<()> {
    validate_webhook_url(webhook_url)?;

    let mut payload = alert_payload(report);
    payload["text"] = serde_json::Value::String(format!(
        "N.E.T.R.A. Alert: [{}] {:.2}% at {} ({})",
        report.score.level, report.score.probability, report.location.name, report.location.state,
    ));
    payload["hostname"] = serde_json::Value::String(hostname_string());
    let payload_str = serde_json::to_string(&payload)?;

    let agent = ureq::AgentBuilder::new()
        .timeout(std::time::Duration::from_secs(5))
        .build();
    let result = agent
        .post(webhook_url)
        .set("Content-Type", "application/json")
        .send_string(&payload_str);

    match result {
        Ok(response) => {
            log::info!(
                "[WEBHOOK] POST to {} succeeded (status {}): {}",
                webhook_url,
                response.status(),
                report.location.name,
            );
            Ok(())
        }
        Err(e) => {
            log::warn!(
                "[WEBHOOK] POST to {} failed: {} (alert for {} still logged locally)",
                webhook_url,
                e,
                report.location.name,
            );
            Err(NetraError::Alert(format!(
                "Webhook POST to {} failed: {}",
                webhook_url, e
            )))
        }
    }
}

/// Queue an e-mail alert as an `.eml` file under `{alert_dir}/email_queue/`.
///
/// Delivery is left to whatever picks up the queue (sendmail, cron).
pub fn send_email(email: &str, report: &AnalysisReport, alert_dir: &Path) -> NetraResult<()> {
    let level = report.score.level;
    let hostname = hostname_string();
    let date_rfc2822 = report.timestamp.format("%a, %d %b %Y %H:%M:%S +0000").to_string();

    let subject = format!(
        "[N.E.T.R.A.] {} - {:.1}% at {}",
        level, report.score.probability, report.location.name
    );

    let mut sensors = String::new();
    for (kind, value) in report.sensors.iter() {
        sensors.push_str(&format!("- {:<17}{:>6.1}\n", kind.label(), value));
    }

    let body = format!(
        "N.E.T.R.A. Threat Alert\n\
         =======================\n\
         \n\
         Timestamp:   {}\n\
         Location:    {}\n\
         State:       {}\n\
         Coordinates: {}\n\
         \n\
         {}\n\
         \n\
         Sensor readings:\n\
         {}\
         \n\
         ---\n\
         Automated alert from {}.\n",
        report.timestamp.to_rfc3339(),
        report.location.name,
        report.location.state,
        report.location.coordinates(),
        scorer::format_score(&report.score),
        sensors,
        hostname,
    );

    let eml_content = format!(
        "From: N.E.T.R.A. Command Center <netra@{}>\r\n\
         To: {}\r\n\
         Subject: {}\r\n\
         Date: {}\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         X-NETRA-Level: {}\r\n\
         X-NETRA-Location: {}\r\n\
         \r\n\
         {}",
        hostname,
        email,
        subject,
        date_rfc2822,
        level,
        report.location.key,
        body,
    );

    let queue_dir = alert_dir.join("email_queue");
    if !queue_dir.exists() {
        std::fs::create_dir_all(&queue_dir)?;
    }

    let stem = format!(
        "netra_{}_{}",
        report.timestamp.format("%Y%m%d_%H%M%S%3f"),
        report.location.key,
    );
    let (eml_path, mut file) = create_queue_file(&queue_dir, &stem)?;
    file.write_all(eml_content.as_bytes())?;
    file.flush()?;

    log::info!(
        "[EMAIL] Queued alert email to {} at {:?}: {} at {}",
        email,
        eml_path,
        level,
        report.location.name,
    );

    Ok(())
}

/// Create `{stem}.eml`, or `{stem}_{n}.eml` when that name is taken.
/// Never overwrites a queued message.
fn create_queue_file(
    queue_dir: &Path,
    stem: &str,
) -> NetraResult<(std::path::PathBuf, std::fs::File)> {
    let mut seq: u32 = 0;
    loop {
        let filename = if seq == 0 {
            format!("{}.eml", stem)
        } else {
            format!("{}_{}.eml", stem, seq)
        };
        let path = queue_dir.join(filename);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => seq += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Get the system hostname, falling back to "unknown".
fn hostname_string() -> String {
    if cfg!(target_os = "windows") {
        std::env::var("COMPUTERNAME").unwrap_or_else(|_| "unknown".to_string())
    } else {
        std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("HOST"))
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_location;
    use crate::history::ThreatHistory;
    use crate::locations::LocationRegistry;
    use crate::scoring::ThreatScorer;
    use crate::SensorReading;

    fn critical_report() -> AnalysisReport {
        analyze_location(
            &ThreatScorer::default(),
            &LocationRegistry::north_east(),
            &mut ThreatHistory::new(),
            "Dimapur_Junction",
            &SensorReading::uniform(100.0),
        )
        .unwrap()
    }

    #[test]
    fn test_log_alert_creates_file() {
        let dir = std::env::temp_dir().join("netra_test_alerts");
        let _ = std::fs::remove_dir_all(&dir);

        let log_path = dir.join("alerts.jsonl");
        log_alert(&log_path, &critical_report()).unwrap();
        assert!(log_path.exists());

        let content = std::fs::read_to_string(&log_path).unwrap();
        let line = content.lines().next().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(parsed["location_key"], "Dimapur_Junction");
        assert_eq!(parsed["threat_level"], "CRITICAL");
        assert_eq!(parsed["probability"], 100.0);
        assert_eq!(parsed["sensors"]["thermal"], 100.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_log_alert_appends() {
        let dir = std::env::temp_dir().join("netra_test_alerts_append");
        let _ = std::fs::remove_dir_all(&dir);

        let log_path = dir.join("alerts.jsonl");
        let report = critical_report();
        log_alert(&log_path, &report).unwrap();
        log_alert(&log_path, &report).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_webhook_rejects_bad_url() {
        assert!(send_webhook("ftp://bad.example.com", &critical_report()).is_err());
        assert!(send_webhook("not-a-url", &critical_report()).is_err());
        assert!(validate_webhook_url("https://hooks.example.com/x").is_ok());
        assert!(validate_webhook_url("http://127.0.0.1:9/x").is_ok());
    }

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}/hook", port)
    }

    #[test]
    fn test_webhook_unreachable_is_error() {
        let err = send_webhook(&closed_port_url(), &critical_report()).unwrap_err();
        assert!(matches!(err, NetraError::Alert(_)));
    }

    #[test]
    fn test_send_email_creates_eml() {
        let dir = std::env::temp_dir().join("netra_test_email");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        send_email("ops@example.com", &critical_report(), &dir).unwrap();

        let queue_dir = dir.join("email_queue");
        let entries: Vec<_> = std::fs::read_dir(&queue_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(entries.len(), 1);

        let eml = std::fs::read_to_string(entries[0].path()).unwrap();
        assert!(eml.contains("To: ops@example.com"));
        assert!(eml.contains("[N.E.T.R.A.] CRITICAL"));
        assert!(eml.contains("Dimapur Junction, Nagaland"));
        assert!(eml.contains("Thermal Scan"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_send_email_same_instant_keeps_both() {
        let dir = std::env::temp_dir().join("netra_test_email_twice");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let report = critical_report();
        send_email("ops@example.com", &report, &dir).unwrap();
        send_email("oncall@example.com", &report, &dir).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.join("email_queue"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("_Dimapur_Junction.eml"));
        assert!(names[1].ends_with("_Dimapur_Junction_1.eml"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_hostname_returns_something() {
        assert!(!hostname_string().is_empty());
    }
}
