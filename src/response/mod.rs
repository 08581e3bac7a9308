//! # Alert Dispatcher
//!
//! Raises alerts when a live analysis comes back at or above the configured
//! level. Channels:
//! - Alert log (JSONL), always
//! - Webhook, when a URL is configured
//! - E-mail queue, when a recipient is configured
//!
//! A failing channel is logged and recorded as not delivered. It never
//! fails the analysis that triggered it. Batch runs do not alert.

pub mod alerter;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::AnalysisReport;
use crate::{AlertConfig, ThreatLevel};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    LogFile,
    Webhook,
    Email,
}

/// One delivery attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AlertRecord {
    pub timestamp: DateTime<Utc>,
    pub channel: AlertChannel,
    pub location: &'static str,
    pub probability: f64,
    pub level: ThreatLevel,
    pub delivered: bool,
}

pub struct AlertDispatcher {
    config: AlertConfig,
    /// Every attempt this session, for audit.
    sent: Vec<AlertRecord>,
}

impl AlertDispatcher {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            config: config.clone(),
            sent: Vec::new(),
        }
    }

    /// Whether a result at `level` should alert.
    pub fn should_alert(&self, level: ThreatLevel) -> bool {
        self.config.enabled && level >= self.config.min_level
    }

    /// Alert on `report` if it is severe enough. Returns the attempts made.
    pub fn notify(&mut self, report: &AnalysisReport) -> Vec<AlertRecord> {
        if !self.should_alert(report.score.level) {
            return Vec::new();
        }

        let mut channels = vec![AlertChannel::LogFile];
        if self.config.webhook_url.is_some() {
            channels.push(AlertChannel::Webhook);
        }
        if self.config.alert_email.is_some() {
            channels.push(AlertChannel::Email);
        }

        let mut records = Vec::with_capacity(channels.len());
        for channel in channels {
            let result = match channel {
                AlertChannel::LogFile => alerter::log_alert(&self.config.alert_log_path, report),
                AlertChannel::Webhook => match self.config.webhook_url {
                    Some(ref url) => alerter::send_webhook(url, report),
                    None => continue,
                },
                AlertChannel::Email => match self.config.alert_email {
                    Some(ref email) => {
                        // E-mail queue lives next to the alert log.
                        let alert_dir = self
                            .config
                            .alert_log_path
                            .parent()
                            .unwrap_or_else(|| std::path::Path::new("."));
                        alerter::send_email(email, report, alert_dir)
                    }
                    None => continue,
                },
            };

            let delivered = match result {
                Ok(()) => true,
                Err(e) => {
                    log::error!(
                        "[RESPONSE] {:?} alert failed for {}: {}",
                        channel,
                        report.location.name,
                        e
                    );
                    false
                }
            };

            records.push(AlertRecord {
                timestamp: report.timestamp,
                channel,
                location: report.location.name,
                probability: report.score.probability,
                level: report.score.level,
                delivered,
            });
        }

        self.sent.extend(records.iter().cloned());
        records
    }

    /// All attempts this session.
    pub fn sent(&self) -> &[AlertRecord] {
        &self.sent
    }

    pub fn delivered_count(&self) -> usize {
        self.sent.iter().filter(|r| r.delivered).count()
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
    use std::path::PathBuf;

    fn config(dir: &str) -> AlertConfig {
        AlertConfig {
            enabled: true,
            min_level: ThreatLevel::High,
            alert_log_path: std::env::temp_dir().join(dir).join("alerts.jsonl"),
            webhook_url: None,
            alert_email: None,
        }
    }

    fn report(value: f64) -> AnalysisReport {
        analyze_location(
            &ThreatScorer::default(),
            &LocationRegistry::north_east(),
            &mut ThreatHistory::new(),
            "Silchar_Medical",
            &SensorReading::uniform(value),
        )
        .unwrap()
    }

    fn cleanup(path: &PathBuf) {
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_below_threshold_is_silent() {
        let cfg = config("netra_test_dispatch_silent");
        cleanup(&cfg.alert_log_path);
        let mut dispatcher = AlertDispatcher::new(&cfg);

        // All 10: base 10, +8 cameras = 18, LOW.
        let records = dispatcher.notify(&report(10.0));
        assert!(records.is_empty());
        assert!(!cfg.alert_log_path.exists());
    }

    #[test]
    fn test_at_threshold_logs() {
        let cfg = config("netra_test_dispatch_log");
        cleanup(&cfg.alert_log_path);
        let mut dispatcher = AlertDispatcher::new(&cfg);

        let records = dispatcher.notify(&report(100.0));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].channel, AlertChannel::LogFile);
        assert!(records[0].delivered);
        assert_eq!(dispatcher.delivered_count(), 1);
        assert!(cfg.alert_log_path.exists());

        cleanup(&cfg.alert_log_path);
    }

    #[test]
    fn test_email_channel_queues_next_to_log() {
        let mut cfg = config("netra_test_dispatch_email");
        cfg.alert_email = Some("ops@example.com".to_string());
        cleanup(&cfg.alert_log_path);
        let mut dispatcher = AlertDispatcher::new(&cfg);

        let records = dispatcher.notify(&report(100.0));
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.delivered));
        let queue = cfg.alert_log_path.parent().unwrap().join("email_queue");
        assert!(queue.exists());

        cleanup(&cfg.alert_log_path);
    }

    #[test]
    fn test_bad_webhook_is_recorded_not_fatal() {
        let mut cfg = config("netra_test_dispatch_webhook");
        cfg.webhook_url = Some("gopher://nope".to_string());
        cleanup(&cfg.alert_log_path);
        let mut dispatcher = AlertDispatcher::new(&cfg);

        let records = dispatcher.notify(&report(100.0));
        assert_eq!(records.len(), 2);
        let webhook = records.iter().find(|r| r.channel == AlertChannel::Webhook).unwrap();
        assert!(!webhook.delivered);
        assert_eq!(dispatcher.delivered_count(), 1);

        cleanup(&cfg.alert_log_path);
    }

    #[test]
    fn test_unreachable_webhook_is_not_delivered() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut cfg = config("netra_test_dispatch_webhook_down");
        cfg.webhook_url = Some(format!("http://127.0.0.1:{}/hook", port));
        cleanup(&cfg.alert_log_path);
        let mut dispatcher = AlertDispatcher::new(&cfg);

        let records = dispatcher.notify(&report(100.0));
        assert_eq!(records.len(), 2);
        let webhook = records.iter().find(|r| r.channel == AlertChannel::Webhook).unwrap();
        assert!(!webhook.delivered);
        assert_eq!(dispatcher.delivered_count(), 1);
        assert_eq!(dispatcher.sent().len(), 2);

        cleanup(&cfg.alert_log_path);
    }

    #[test]
    fn test_disabled_never_alerts() {
        let mut cfg = config("netra_test_dispatch_disabled");
        cfg.enabled = false;
        let dispatcher = AlertDispatcher::new(&cfg);
        assert!(!dispatcher.should_alert(ThreatLevel::Critical));
    }
}
