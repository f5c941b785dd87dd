//! Prediction orchestrator
//!
//! Wires the model registry, candidate filter, smoothing and agronomic
//! scoring into one `predict` call.

use crate::agronomy;
use crate::config::EngineConfig;
use crate::constraints::ConstraintTable;
use crate::filter::CandidateFilter;
use crate::smoothing::smooth;
use cropwise_classifiers::ModelRegistry;
use cropwise_core::{
    Error, FeatureRecord, PredictionRequest, PredictionResult, Result, Stage,
};
use cropwise_telemetry::{MetricsCollector, ERRORS_TOTAL, PREDICTIONS_TOTAL, PREDICTION_LATENCY_US};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Recommended-crop text when no candidate survives soil filtering
pub const NO_MATCH: &str = "No suitable match for this soil";

/// End-to-end crop recommender
pub struct CropPredictor {
    registry: Arc<ModelRegistry>,
    filter: CandidateFilter,
    constraints: Arc<ConstraintTable>,
    config: EngineConfig,
    metrics: MetricsCollector,
}

impl CropPredictor {
    /// Create a predictor; the configuration is validated here
    pub fn new(
        registry: Arc<ModelRegistry>,
        constraints: Arc<ConstraintTable>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let filter = CandidateFilter::new(Arc::clone(&constraints), &config.filter);

        info!(
            default_model = %config.default_model,
            constrained_crops = constraints.len(),
            "Crop predictor ready"
        );

        Ok(Self {
            registry,
            filter,
            constraints,
            config,
            metrics: MetricsCollector::new(),
        })
    }

    /// Share an existing metrics collector
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Validate a raw request and predict with the requested or default model
    pub async fn predict_request(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        let record = match request.validate() {
            Ok(record) => record,
            Err(e) => {
                self.metrics.record_client_error();
                metrics::counter!(ERRORS_TOTAL, "kind" => "validation").increment(1);
                return Err(e);
            }
        };

        let model = request
            .model_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.config.default_model);

        self.predict(&record, model).await
    }

    /// Run the full pipeline for one validated record
    pub async fn predict(&self, record: &FeatureRecord, model: &str) -> Result<PredictionResult> {
        let start = Instant::now();

        let outcome = self.run(record, model).await;
        let latency_us = start.elapsed().as_micros() as u64;
        metrics::histogram!(PREDICTION_LATENCY_US).record(latency_us as f64);

        match &outcome {
            Ok(result) => {
                let matched = result.has_match();
                self.metrics.record_prediction(matched, latency_us);
                metrics::counter!(
                    PREDICTIONS_TOTAL,
                    "outcome" => if matched { "match" } else { "no_match" }
                )
                .increment(1);
            }
            Err(e) => {
                self.metrics.record_failure();
                metrics::counter!(ERRORS_TOTAL, "kind" => error_kind(e)).increment(1);
            }
        }

        outcome
    }

    async fn run(&self, record: &FeatureRecord, model: &str) -> Result<PredictionResult> {
        let loaded = self.registry.resolve(model).await?;
        let encoder = self.registry.label_encoder();

        let inference_start = Instant::now();
        let probabilities = loaded
            .classifier
            .predict_proba(&record.features())
            .await
            .map_err(|e| match e {
                Error::Inference { .. } => e,
                other => Error::inference(model, Stage::Inference, other.to_string()),
            })?;
        self.metrics
            .record_inference_latency(inference_start.elapsed().as_micros() as u64);

        if probabilities.len() != encoder.len() {
            return Err(Error::inference(
                model,
                Stage::Inference,
                format!(
                    "returned {} probabilities for {} classes",
                    probabilities.len(),
                    encoder.len()
                ),
            ));
        }

        let candidates = self
            .filter
            .filter(model, &probabilities, record.soil_type, encoder)?;

        if candidates.is_empty() {
            debug!(model, soil = %record.soil_type, "No candidate survived soil filtering");
            return Ok(PredictionResult {
                recommended_crop: NO_MATCH.to_string(),
                other_valid_options: Vec::new(),
                crop_matches: Vec::new(),
                metrics: None,
                logic: format!("{} + Soil constraint filter", model),
            });
        }

        let params = self.config.smoothing.params_for(model);
        let crop_matches = smooth(&candidates, &params);
        debug!(
            model,
            temperature = params.temperature,
            fallback = loaded.fallback,
            candidates = crop_matches.len(),
            "Smoothed candidates"
        );

        let recommended_crop = crop_matches[0].crop.clone();
        let agronomic = agronomy::score(record, &recommended_crop, &self.constraints);

        Ok(PredictionResult {
            other_valid_options: crop_matches[1..].iter().map(|m| m.crop.clone()).collect(),
            recommended_crop,
            crop_matches,
            metrics: Some(agronomic),
            logic: format!("{} + Adaptive temp. smoothing (T={:?})", model, params.temperature),
        })
    }
}

impl std::fmt::Debug for CropPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropPredictor")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

fn error_kind(error: &Error) -> &'static str {
    match error {
        Error::Validation(_) => "validation",
        Error::ModelLoad { .. } => "model_load",
        Error::Inference { .. } => "inference",
        Error::Artifact(_) => "artifact",
        Error::Config(_) => "config",
        Error::Io(_) | Error::Serialization(_) => "io",
    }
}
