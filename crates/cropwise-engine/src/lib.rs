//! Cropwise Engine
//!
//! The prediction pipeline that turns a classifier's class-probability
//! distribution into a crop recommendation:
//! - Candidate generation with soil-compatibility filtering
//! - Adaptive temperature smoothing into match percentages
//! - Agronomic scoring of the recommended crop
//!
//! [`CropPredictor`] ties these stages to a [`cropwise_classifiers::ModelRegistry`].

pub mod agronomy;
pub mod config;
pub mod constraints;
pub mod filter;
pub mod predictor;
pub mod smoothing;

pub use config::{EngineConfig, FilterConfig, SmoothingConfig};
pub use constraints::ConstraintTable;
pub use filter::{top_indices, CandidateFilter};
pub use predictor::{CropPredictor, NO_MATCH};
pub use smoothing::{smooth, total_percentage, SmoothingParams, PROBABILITY_EPSILON};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::constraints::ConstraintTable;
    pub use crate::predictor::CropPredictor;
}
