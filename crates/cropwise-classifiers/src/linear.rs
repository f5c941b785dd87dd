//! Linear classifier with softmax output
//!
//! Covers multinomial logistic regression and calibrated linear SVM
//! exports: `p = softmax(W · ((x - mean) / scale) + b)`.

use crate::classifier::{softmax, ClassProbabilities, Classifier, ClassifierKind};
use crate::gaussian_nb::feature_rows;
use async_trait::async_trait;
use cropwise_core::{Error, FeatureVector, Result, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// Serialized parameters of a linear model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearParams {
    /// Weights: [n_classes][n_features]
    pub coef: Vec<Vec<f64>>,

    /// Bias per class
    pub intercept: Vec<f64>,

    /// Standard-scaler mean applied before the weights
    #[serde(default)]
    pub scaler_mean: Option<Vec<f64>>,

    /// Standard-scaler scale applied before the weights
    #[serde(default)]
    pub scaler_scale: Option<Vec<f64>>,
}

/// Linear softmax classifier
#[derive(Debug)]
pub struct LinearClassifier {
    name: String,
    coef: Vec<FeatureVector>,
    intercept: Vec<f64>,
    mean: FeatureVector,
    scale: FeatureVector,
}

impl LinearClassifier {
    /// Build a classifier from exported parameters
    pub fn from_params(name: impl Into<String>, params: LinearParams, n_classes: usize) -> Result<Self> {
        let coef = feature_rows("coef", &params.coef, n_classes)?;

        if params.intercept.len() != n_classes {
            return Err(Error::artifact(format!(
                "expected {} intercept values, got {}",
                n_classes,
                params.intercept.len()
            )));
        }

        let mean = scaler_vector("scaler_mean", params.scaler_mean, 0.0)?;
        let scale = scaler_vector("scaler_scale", params.scaler_scale, 1.0)?;
        if scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(Error::artifact("scaler_scale must be finite and non-zero"));
        }

        Ok(Self {
            name: name.into(),
            coef,
            intercept: params.intercept,
            mean,
            scale,
        })
    }

    fn decision_scores(&self, features: &FeatureVector) -> Vec<f64> {
        let mut scaled = [0.0; FEATURE_COUNT];
        for (i, x) in features.iter().enumerate() {
            scaled[i] = (x - self.mean[i]) / self.scale[i];
        }

        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, bias)| {
                weights.iter().zip(&scaled).map(|(w, x)| w * x).sum::<f64>() + bias
            })
            .collect()
    }
}

#[async_trait]
impl Classifier for LinearClassifier {
    async fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities> {
        Ok(softmax(&self.decision_scores(features)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Linear
    }

    fn n_classes(&self) -> usize {
        self.intercept.len()
    }
}

fn scaler_vector(field: &str, values: Option<Vec<f64>>, default: f64) -> Result<FeatureVector> {
    match values {
        None => Ok([default; FEATURE_COUNT]),
        Some(v) => FeatureVector::try_from(v.as_slice()).map_err(|_| {
            Error::artifact(format!(
                "{} has {} elements, expected {}",
                field,
                v.len(),
                FEATURE_COUNT
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_weights_reproduce_intercept_distribution() {
        let params = LinearParams {
            coef: vec![vec![0.0; 7]; 3],
            intercept: vec![0.6f64.ln(), 0.3f64.ln(), 0.1f64.ln()],
            scaler_mean: None,
            scaler_scale: None,
        };
        let model = LinearClassifier::from_params("fixed", params, 3).unwrap();

        let probs = model.predict_proba(&[1.0; 7]).await.unwrap();
        assert!((probs[0] - 0.6).abs() < 1e-12);
        assert!((probs[1] - 0.3).abs() < 1e-12);
        assert!((probs[2] - 0.1).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_scaler_is_applied() {
        let mut coef = vec![vec![0.0; 7]; 2];
        coef[0][6] = 1.0;
        coef[1][6] = -1.0;
        let params = LinearParams {
            coef,
            intercept: vec![0.0, 0.0],
            scaler_mean: Some(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 100.0]),
            scaler_scale: Some(vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 50.0]),
        };
        let model = LinearClassifier::from_params("rain", params, 2).unwrap();

        let wet = model.predict_proba(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 200.0]).await.unwrap();
        let dry = model.predict_proba(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).await.unwrap();
        assert!(wet[0] > wet[1]);
        assert!(dry[1] > dry[0]);

        let even = model.predict_proba(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 100.0]).await.unwrap();
        assert!((even[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_scale_rejected() {
        let params = LinearParams {
            coef: vec![vec![0.0; 7]; 2],
            intercept: vec![0.0, 0.0],
            scaler_mean: None,
            scaler_scale: Some(vec![1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0]),
        };
        assert!(LinearClassifier::from_params("bad", params, 2).is_err());
    }
}
