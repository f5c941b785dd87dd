//! Prediction metrics collection and reporting

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counter of completed predictions, labelled by outcome
pub const PREDICTIONS_TOTAL: &str = "cropwise_predictions_total";

/// End-to-end prediction latency histogram
pub const PREDICTION_LATENCY_US: &str = "cropwise_prediction_latency_us";

/// Counter of failed predictions, labelled by error kind
pub const ERRORS_TOTAL: &str = "cropwise_errors_total";

/// Register descriptions for the facade metrics emitted by the engine.
///
/// Harmless when no recorder is installed.
pub fn describe_metrics() {
    metrics::describe_counter!(
        PREDICTIONS_TOTAL,
        "Total number of predictions by model and outcome"
    );
    metrics::describe_histogram!(
        PREDICTION_LATENCY_US,
        metrics::Unit::Microseconds,
        "Prediction latency in microseconds"
    );
    metrics::describe_counter!(ERRORS_TOTAL, "Total number of failed predictions by kind");
}

/// In-process counters for one predictor
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    predictions: AtomicU64,
    no_match: AtomicU64,
    client_errors: AtomicU64,
    failures: AtomicU64,
    total_latency_us: AtomicU64,
    inference_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Record a completed prediction
    pub fn record_prediction(&self, matched: bool, latency_us: u64) {
        self.inner.predictions.fetch_add(1, Ordering::Relaxed);
        if !matched {
            self.inner.no_match.fetch_add(1, Ordering::Relaxed);
        }
        self.inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
    }

    /// Record time spent inside a classifier
    pub fn record_inference_latency(&self, latency_us: u64) {
        self.inner
            .inference_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
    }

    /// Record a request rejected by validation
    pub fn record_client_error(&self) {
        self.inner.client_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a service-side failure
    pub fn record_failure(&self) {
        self.inner.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions: self.inner.predictions.load(Ordering::Relaxed),
            no_match: self.inner.no_match.load(Ordering::Relaxed),
            client_errors: self.inner.client_errors.load(Ordering::Relaxed),
            failures: self.inner.failures.load(Ordering::Relaxed),
            total_latency_us: self.inner.total_latency_us.load(Ordering::Relaxed),
            inference_latency_us: self.inner.inference_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MetricsCollector").field(&self.snapshot()).finish()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub predictions: u64,
    pub no_match: u64,
    pub client_errors: u64,
    pub failures: u64,
    pub total_latency_us: u64,
    pub inference_latency_us: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per prediction
    pub fn avg_latency_us(&self) -> u64 {
        if self.predictions == 0 {
            0
        } else {
            self.total_latency_us / self.predictions
        }
    }

    /// Calculate average classifier latency per prediction
    pub fn avg_inference_latency_us(&self) -> u64 {
        if self.predictions == 0 {
            0
        } else {
            self.inference_latency_us / self.predictions
        }
    }

    /// Share of predictions where no candidate survived soil filtering
    pub fn no_match_rate(&self) -> f64 {
        if self.predictions == 0 {
            0.0
        } else {
            self.no_match as f64 / self.predictions as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let metrics = MetricsCollector::new();

        metrics.record_prediction(true, 3000);
        metrics.record_prediction(false, 1000);
        metrics.record_inference_latency(800);
        metrics.record_client_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.predictions, 2);
        assert_eq!(snapshot.no_match, 1);
        assert_eq!(snapshot.client_errors, 1);
        assert_eq!(snapshot.failures, 0);
        assert_eq!(snapshot.avg_latency_us(), 2000);
        assert_eq!(snapshot.avg_inference_latency_us(), 400);
        assert!((snapshot.no_match_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_snapshot_has_zero_rates() {
        let snapshot = MetricsCollector::new().snapshot();
        assert_eq!(snapshot.avg_latency_us(), 0);
        assert_eq!(snapshot.no_match_rate(), 0.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = MetricsCollector::new();
        let clone = metrics.clone();
        clone.record_failure();
        assert_eq!(metrics.snapshot().failures, 1);
    }

    #[test]
    fn test_describe_without_recorder() {
        describe_metrics();
    }
}
