//! Error types for Cropwise

use std::fmt;

/// Result type alias using Cropwise's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage at which a prediction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Classifier produced (or failed to produce) class probabilities
    Inference,
    /// Class index could not be mapped to a crop name
    Decode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inference => "inference",
            Self::Decode => "label decoding",
        };
        f.write_str(name)
    }
}

/// Core error type for Cropwise operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request fields missing, non-numeric, or out of vocabulary
    #[error("invalid input: {0}")]
    Validation(String),

    /// A model (or its fallback) could not be loaded
    #[error("failed to load model '{model}': {reason}")]
    ModelLoad { model: String, reason: String },

    /// Failure inside the prediction pipeline
    #[error("model '{model}' failed during {stage}: {reason}")]
    Inference {
        model: String,
        stage: Stage,
        reason: String,
    },

    /// Artifact envelope or payload is malformed
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new model load error
    pub fn model_load(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModelLoad {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Create a new inference error for the given stage
    pub fn inference(model: impl Into<String>, stage: Stage, reason: impl Into<String>) -> Self {
        Self::Inference {
            model: model.into(),
            stage,
            reason: reason.into(),
        }
    }

    /// Create a new artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the caller supplied bad input (as opposed to a service fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
