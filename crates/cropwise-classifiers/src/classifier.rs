//! Classifier trait and common types

use async_trait::async_trait;
use cropwise_core::{FeatureVector, Result};
use std::fmt;

/// Per-class probabilities, indexed by the shared label encoder
pub type ClassProbabilities = Vec<f64>;

/// Trait for all crop classifiers
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Probability distribution over the known crop classes
    async fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Model family this classifier was decoded as
    fn kind(&self) -> ClassifierKind;

    /// Number of classes in the output distribution
    fn n_classes(&self) -> usize;
}

impl fmt::Debug for dyn Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("n_classes", &self.n_classes())
            .finish()
    }
}

/// Model family of a decoded artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    /// Gaussian naive Bayes
    GaussianNb,
    /// Softmax over linear decision scores
    Linear,
    /// Averaged decision trees with probability leaves
    Forest,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GaussianNb => "gaussian_nb",
            Self::Linear => "linear",
            Self::Forest => "forest",
        })
    }
}

/// Numerically stable softmax over raw scores
pub fn softmax(scores: &[f64]) -> ClassProbabilities {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        let uniform = 1.0 / scores.len().max(1) as f64;
        return vec![uniform; scores.len()];
    }

    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
