//! Cropwise Core
//!
//! Core types and error handling shared across Cropwise components.
//!
//! This crate provides:
//! - The feature schema (seven numeric measurements plus a soil type)
//! - Request validation for caller-supplied measurements
//! - Candidate, match, metric, and result types produced by the pipeline
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result, Stage};
pub use types::{
    AgronomicMetrics, Candidate, CropMatch, FeatureRecord, FeatureVector, NutrientLevel,
    PhSuitability, PredictionRequest, PredictionResult, SoilType, WaterStress, FEATURE_COUNT,
    FEATURE_NAMES,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, Stage};
    pub use crate::types::{
        Candidate, CropMatch, FeatureRecord, FeatureVector, PredictionRequest, PredictionResult,
        SoilType,
    };
}
