//! Gaussian naive Bayes classifier
//!
//! Stores per-class feature means and variances exported from a fitted
//! model. Variances are floored at load time and two arrays are precomputed
//! so that prediction needs no logarithms or divisions:
//! - `neg_half_log_var[c][i] = -0.5 * ln(var)`
//! - `inv_2var[c][i] = 1 / (2 * var)`

use crate::classifier::{softmax, ClassProbabilities, Classifier, ClassifierKind};
use async_trait::async_trait;
use cropwise_core::{Error, FeatureVector, Result, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// Minimum variance, matching the usual `var_smoothing` default.
const VAR_SMOOTHING: f64 = 1e-9;

/// Serialized parameters of a Gaussian naive Bayes model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNbParams {
    /// ln(P(class)) per class
    pub class_log_prior: Vec<f64>,

    /// Per-class feature means: [n_classes][n_features]
    pub theta: Vec<Vec<f64>>,

    /// Per-class feature variances: [n_classes][n_features]
    pub var: Vec<Vec<f64>>,
}

/// Gaussian naive Bayes classifier
#[derive(Debug)]
pub struct GaussianNbClassifier {
    name: String,
    class_log_prior: Vec<f64>,
    theta: Vec<FeatureVector>,
    neg_half_log_var: Vec<FeatureVector>,
    inv_2var: Vec<FeatureVector>,
}

impl GaussianNbClassifier {
    /// Build a classifier from exported parameters
    pub fn from_params(name: impl Into<String>, params: GaussianNbParams, n_classes: usize) -> Result<Self> {
        if params.class_log_prior.len() != n_classes {
            return Err(Error::artifact(format!(
                "expected {} class_log_prior values, got {}",
                n_classes,
                params.class_log_prior.len()
            )));
        }

        let theta = feature_rows("theta", &params.theta, n_classes)?;
        let var = feature_rows("var", &params.var, n_classes)?;

        let mut neg_half_log_var = Vec::with_capacity(n_classes);
        let mut inv_2var = Vec::with_capacity(n_classes);
        for row in &var {
            let mut nhlv = [0.0; FEATURE_COUNT];
            let mut i2v = [0.0; FEATURE_COUNT];
            for (i, v) in row.iter().enumerate() {
                let v = v.max(VAR_SMOOTHING);
                nhlv[i] = -0.5 * v.ln();
                i2v[i] = 1.0 / (2.0 * v);
            }
            neg_half_log_var.push(nhlv);
            inv_2var.push(i2v);
        }

        Ok(Self {
            name: name.into(),
            class_log_prior: params.class_log_prior,
            theta,
            neg_half_log_var,
            inv_2var,
        })
    }

    fn joint_log_likelihood(&self, features: &FeatureVector) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .enumerate()
            .map(|(class, prior)| {
                features.iter().enumerate().fold(*prior, |acc, (i, x)| {
                    acc + self.neg_half_log_var[class][i]
                        - (x - self.theta[class][i]).powi(2) * self.inv_2var[class][i]
                })
            })
            .collect()
    }
}

#[async_trait]
impl Classifier for GaussianNbClassifier {
    async fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities> {
        Ok(softmax(&self.joint_log_likelihood(features)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::GaussianNb
    }

    fn n_classes(&self) -> usize {
        self.class_log_prior.len()
    }
}

/// Check a [n_classes][FEATURE_COUNT] matrix and convert it to fixed-width rows
pub(crate) fn feature_rows(field: &str, rows: &[Vec<f64>], n_classes: usize) -> Result<Vec<FeatureVector>> {
    if rows.len() != n_classes {
        return Err(Error::artifact(format!(
            "expected {} {} rows, got {}",
            n_classes,
            field,
            rows.len()
        )));
    }

    rows.iter()
        .enumerate()
        .map(|(class, row)| {
            FeatureVector::try_from(row.as_slice()).map_err(|_| {
                Error::artifact(format!(
                    "{}[{}] has {} elements, expected {}",
                    field,
                    class,
                    row.len(),
                    FEATURE_COUNT
                ))
            })
        })
        .collect()
}
