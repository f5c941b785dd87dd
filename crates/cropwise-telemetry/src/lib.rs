//! Cropwise Telemetry
//!
//! Operational metrics for the prediction pipeline.
//!
//! Provides:
//! - An in-process collector with derived averages and rates
//! - Names and descriptions of the `metrics` facade events the engine emits

pub mod metrics;

pub use metrics::{
    describe_metrics, MetricsCollector, MetricsSnapshot, ERRORS_TOTAL, PREDICTIONS_TOTAL,
    PREDICTION_LATENCY_US,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
}
