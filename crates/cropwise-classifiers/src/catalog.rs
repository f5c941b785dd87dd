//! Fixed catalog of selectable classifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Artifact loaded when a model has no dedicated artifact
pub const FALLBACK_ARTIFACT: &str = "model.json";

/// Shared label encoder artifact
pub const LABEL_ENCODER_ARTIFACT: &str = "label_encoder.json";

/// Plain-text marker naming the model the fallback artifact was trained as
pub const ACTIVE_MODEL_MARKER: &str = "active_model.txt";

/// Per-model evaluation scores written at training time
pub const METRICS_SUMMARY_ARTIFACT: &str = "model_metrics.csv";

/// Classifiers a caller can select by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    NaiveBayes,
    RandomForest,
    XgBoost,
    CatBoost,
    Svm,
}

/// How strongly a classifier's raw probabilities need flattening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Routinely puts ~100% on one class
    Overconfident,
    /// Reasonably spread output
    Balanced,
}

impl ModelKind {
    /// Every catalog entry
    pub const ALL: [ModelKind; 5] = [
        Self::NaiveBayes,
        Self::RandomForest,
        Self::XgBoost,
        Self::CatBoost,
        Self::Svm,
    ];

    /// Model used when a request names none
    pub const BASELINE: ModelKind = Self::NaiveBayes;

    /// Name shown to and sent by callers
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NaiveBayes => "Naive Bayes",
            Self::RandomForest => "Random Forest",
            Self::XgBoost => "XGBoost",
            Self::CatBoost => "CatBoost",
            Self::Svm => "SVM",
        }
    }

    /// Dedicated artifact for this model
    pub fn artifact_name(&self) -> &'static str {
        match self {
            Self::NaiveBayes => "naive_bayes.json",
            Self::RandomForest => "random_forest.json",
            Self::XgBoost => "xgboost.json",
            Self::CatBoost => "catboost.json",
            Self::Svm => "svm.json",
        }
    }

    /// Confidence tier used unless configuration overrides it
    pub fn default_tier(&self) -> ConfidenceTier {
        match self {
            Self::NaiveBayes => ConfidenceTier::Overconfident,
            _ => ConfidenceTier::Balanced,
        }
    }

    /// Look up a model by display name or artifact stem, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL.iter().copied().find(|kind| {
            kind.display_name().eq_ignore_ascii_case(wanted)
                || kind
                    .artifact_name()
                    .trim_end_matches(".json")
                    .eq_ignore_ascii_case(wanted)
        })
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
