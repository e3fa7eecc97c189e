//! Bot metrics and observability.
//!
//! Counters for the event pipeline: how many events arrived, how many were
//! suppressed as duplicates, and how translations and detection fared. The
//! report is logged at shutdown.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Event pipeline counters, shared between the HTTP server and the router.
#[derive(Debug, Default)]
pub struct BotMetrics {
    /// Events accepted from Slack and queued for the router
    events_received: AtomicUsize,

    /// Events dropped by the dedup cache
    duplicates_suppressed: AtomicUsize,

    /// Translations posted back to Slack
    translations_delivered: AtomicUsize,

    /// Translation or delivery failures
    translation_failures: AtomicUsize,

    /// Texts whose language could not be determined
    detection_failures: AtomicUsize,

    /// Ephemeral error messages shown to users
    user_errors: AtomicUsize,
}

impl BotMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translation_delivered(&self) {
        self.translations_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translation_failure(&self) {
        self.translation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_detection_failure(&self) {
        self.detection_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_user_error(&self) {
        self.user_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn events_received(&self) -> usize {
        self.events_received.load(Ordering::Relaxed)
    }

    pub fn duplicates_suppressed(&self) -> usize {
        self.duplicates_suppressed.load(Ordering::Relaxed)
    }

    pub fn translations_delivered(&self) -> usize {
        self.translations_delivered.load(Ordering::Relaxed)
    }

    pub fn translation_failures(&self) -> usize {
        self.translation_failures.load(Ordering::Relaxed)
    }

    pub fn detection_failures(&self) -> usize {
        self.detection_failures.load(Ordering::Relaxed)
    }

    pub fn user_errors(&self) -> usize {
        self.user_errors.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let delivered = self.translations_delivered();
        let failures = self.translation_failures();
        let attempts = delivered + failures;
        let translation_success_rate = if attempts > 0 {
            (delivered as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            events_received: self.events_received(),
            duplicates_suppressed: self.duplicates_suppressed(),
            translations_delivered: delivered,
            translation_failures: failures,
            translation_success_rate,
            detection_failures: self.detection_failures(),
            user_errors: self.user_errors(),
        }
    }
}

/// Snapshot of the pipeline counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub events_received: usize,
    pub duplicates_suppressed: usize,
    pub translations_delivered: usize,
    pub translation_failures: usize,

    /// Percentage (0-100) of translation attempts that were delivered
    pub translation_success_rate: f64,

    pub detection_failures: usize,
    pub user_errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = BotMetrics::new();
        assert_eq!(metrics.events_received(), 0);
        assert_eq!(metrics.duplicates_suppressed(), 0);
        assert_eq!(metrics.user_errors(), 0);
    }

    #[test]
    fn test_record_counters() {
        let metrics = BotMetrics::new();
        metrics.record_event_received();
        metrics.record_event_received();
        metrics.record_duplicate();
        metrics.record_detection_failure();
        metrics.record_user_error();

        assert_eq!(metrics.events_received(), 2);
        assert_eq!(metrics.duplicates_suppressed(), 1);
        assert_eq!(metrics.detection_failures(), 1);
        assert_eq!(metrics.user_errors(), 1);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = BotMetrics::new().report();
        assert_eq!(report.translations_delivered, 0);
        assert_eq!(report.translation_success_rate, 0.0);
    }

    #[test]
    fn test_report_translation_success_rate() {
        let metrics = BotMetrics::new();
        // 3 delivered, 1 failed = 75%
        metrics.record_translation_delivered();
        metrics.record_translation_delivered();
        metrics.record_translation_delivered();
        metrics.record_translation_failure();

        let report = metrics.report();
        assert_eq!(report.translations_delivered, 3);
        assert_eq!(report.translation_failures, 1);
        assert_eq!(report.translation_success_rate, 75.0);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = BotMetrics::new();
        metrics.record_event_received();
        let json = serde_json::to_value(metrics.report()).unwrap();
        assert_eq!(json["events_received"], 1);
        assert!(json.get("translation_success_rate").is_some());
    }
}
