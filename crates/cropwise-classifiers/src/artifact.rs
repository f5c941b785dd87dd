//! Versioned model artifacts
//!
//! Artifacts are opaque byte blobs fetched from an [`ArtifactSource`]. This
//! module owns their deserialization contract: a JSON envelope carrying a
//! format version, the feature/class dimensions, and one classifier payload.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "naive_bayes",
//!   "n_features": 7,
//!   "n_classes": 22,
//!   "classifier": { "kind": "gaussian_nb", "class_log_prior": [...], "theta": [...], "var": [...] }
//! }
//! ```
//!
//! [`ArtifactSource`]: crate::source::ArtifactSource

use crate::classifier::Classifier;
use crate::forest::{ForestClassifier, ForestParams};
use crate::gaussian_nb::{GaussianNbClassifier, GaussianNbParams};
use crate::label_encoder::LabelEncoder;
use crate::linear::{LinearClassifier, LinearParams};
use cropwise_core::{Error, Result, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Artifact format version understood by this build
pub const FORMAT_VERSION: u32 = 1;

/// Envelope shared by every classifier artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub format_version: u32,

    /// Human-readable model name; the artifact name is used when empty
    #[serde(default)]
    pub name: String,

    pub n_features: usize,

    pub n_classes: usize,

    pub classifier: ClassifierSpec,
}

/// Model-family specific payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    GaussianNb(GaussianNbParams),
    Linear(LinearParams),
    Forest(ForestParams),
}

impl ClassifierArtifact {
    /// Wrap a payload in a current-version envelope
    pub fn new(name: impl Into<String>, n_classes: usize, classifier: ClassifierSpec) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            name: name.into(),
            n_features: FEATURE_COUNT,
            n_classes,
            classifier,
        }
    }

    /// Serialize to the on-disk JSON form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Label encoder artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoderArtifact {
    pub format_version: u32,
    pub classes: Vec<String>,
}

impl LabelEncoderArtifact {
    /// Wrap class names in a current-version envelope
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            format_version: FORMAT_VERSION,
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Serialize to the on-disk JSON form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Decode a classifier artifact and check it against the shared encoder
pub fn decode_classifier(
    artifact_name: &str,
    bytes: &[u8],
    encoder: &LabelEncoder,
) -> Result<Arc<dyn Classifier>> {
    let artifact: ClassifierArtifact = serde_json::from_slice(bytes)
        .map_err(|e| Error::artifact(format!("{}: malformed artifact: {}", artifact_name, e)))?;

    check_version(artifact_name, artifact.format_version)?;

    if artifact.n_features != FEATURE_COUNT {
        return Err(Error::artifact(format!(
            "{}: expects {} features, the feature schema has {}",
            artifact_name, artifact.n_features, FEATURE_COUNT
        )));
    }

    if artifact.n_classes != encoder.len() {
        return Err(Error::artifact(format!(
            "{}: trained on {} classes but the label encoder has {}",
            artifact_name,
            artifact.n_classes,
            encoder.len()
        )));
    }

    let name = if artifact.name.is_empty() {
        artifact_name.to_string()
    } else {
        artifact.name
    };
    let n_classes = artifact.n_classes;

    let classifier: Arc<dyn Classifier> = match artifact.classifier {
        ClassifierSpec::GaussianNb(params) => {
            Arc::new(GaussianNbClassifier::from_params(name, params, n_classes)?)
        }
        ClassifierSpec::Linear(params) => {
            Arc::new(LinearClassifier::from_params(name, params, n_classes)?)
        }
        ClassifierSpec::Forest(params) => {
            Arc::new(ForestClassifier::from_params(name, params, n_classes)?)
        }
    };

    Ok(classifier)
}

/// Decode the shared label encoder artifact
pub fn decode_label_encoder(artifact_name: &str, bytes: &[u8]) -> Result<LabelEncoder> {
    let artifact: LabelEncoderArtifact = serde_json::from_slice(bytes)
        .map_err(|e| Error::artifact(format!("{}: malformed label encoder: {}", artifact_name, e)))?;

    check_version(artifact_name, artifact.format_version)?;
    LabelEncoder::from_classes(artifact.classes)
}

fn check_version(artifact_name: &str, version: u32) -> Result<()> {
    if version != FORMAT_VERSION {
        return Err(Error::artifact(format!(
            "{}: unsupported format version {} (expected {})",
            artifact_name, version, FORMAT_VERSION
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierKind;

    fn encoder() -> LabelEncoder {
        LabelEncoder::from_classes(["maize", "rice"]).unwrap()
    }

    fn linear_payload() -> ClassifierSpec {
        ClassifierSpec::Linear(LinearParams {
            coef: vec![vec![0.0; 7]; 2],
            intercept: vec![0.0, 0.0],
            scaler_mean: None,
            scaler_scale: None,
        })
    }

    #[test]
    fn test_decode_linear_artifact() {
        let bytes = ClassifierArtifact::new("svm", 2, linear_payload()).to_bytes().unwrap();

        let classifier = decode_classifier("svm.json", &bytes, &encoder()).unwrap();
        assert_eq!(classifier.kind(), ClassifierKind::Linear);
        assert_eq!(classifier.name(), "svm");
        assert_eq!(classifier.n_classes(), 2);
    }

    #[test]
    fn test_class_count_must_match_encoder() {
        let bytes = ClassifierArtifact::new("svm", 3, ClassifierSpec::Linear(LinearParams {
            coef: vec![vec![0.0; 7]; 3],
            intercept: vec![0.0; 3],
            scaler_mean: None,
            scaler_scale: None,
        }))
        .to_bytes()
        .unwrap();

        let err = decode_classifier("svm.json", &bytes, &encoder()).unwrap_err();
        assert!(err.to_string().contains("label encoder has 2"));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut artifact = ClassifierArtifact::new("svm", 2, linear_payload());
        artifact.format_version = 2;
        let bytes = artifact.to_bytes().unwrap();

        let err = decode_classifier("svm.json", &bytes, &encoder()).unwrap_err();
        assert!(err.to_string().contains("unsupported format version 2"));
    }

    #[test]
    fn test_garbage_is_artifact_error() {
        let err = decode_classifier("model.json", b"\x80\x04pickle", &encoder()).unwrap_err();
        assert!(matches!(err, Error::Artifact(_)));
    }

    #[test]
    fn test_decode_label_encoder() {
        let bytes = LabelEncoderArtifact::new(["rice", "maize"]).to_bytes().unwrap();
        let encoder = decode_label_encoder("label_encoder.json", &bytes).unwrap();
        assert_eq!(encoder.decode(1), Some("maize"));
    }
}
