//! Cropwise Classifiers
//!
//! Crop classifiers decoded from versioned artifacts, and the registry that
//! loads each of them at most once.
//!
//! Three model families are supported:
//! - Gaussian naive Bayes
//! - Linear softmax models (logistic regression, calibrated linear SVM)
//! - Decision forests with probability leaves (random forest, boosted exports)
//!
//! Every classifier shares one label encoder so that class index `i` means
//! the same crop regardless of which model produced it.

pub mod artifact;
pub mod catalog;
pub mod classifier;
pub mod forest;
pub mod gaussian_nb;
pub mod label_encoder;
pub mod linear;
pub mod registry;
pub mod source;
pub mod summary;

pub use artifact::{
    decode_classifier, decode_label_encoder, ClassifierArtifact, ClassifierSpec,
    LabelEncoderArtifact, FORMAT_VERSION,
};
pub use catalog::{
    ConfidenceTier, ModelKind, ACTIVE_MODEL_MARKER, FALLBACK_ARTIFACT, LABEL_ENCODER_ARTIFACT,
    METRICS_SUMMARY_ARTIFACT,
};
pub use classifier::{softmax, ClassProbabilities, Classifier, ClassifierKind};
pub use forest::{ForestClassifier, ForestParams, NodeParams, TreeParams};
pub use gaussian_nb::{GaussianNbClassifier, GaussianNbParams};
pub use label_encoder::{normalize_label, LabelEncoder};
pub use linear::{LinearClassifier, LinearParams};
pub use registry::{LoadedModel, ModelAvailability, ModelRegistry, ModelSlot};
pub use source::{ArtifactSource, FsArtifactSource, MemoryArtifactSource};
pub use summary::{parse_summary, ModelEvaluation, NO_DATA};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::{ConfidenceTier, ModelKind};
    pub use crate::classifier::{ClassProbabilities, Classifier};
    pub use crate::label_encoder::LabelEncoder;
    pub use crate::registry::{LoadedModel, ModelRegistry};
    pub use crate::source::{ArtifactSource, FsArtifactSource, MemoryArtifactSource};
}
