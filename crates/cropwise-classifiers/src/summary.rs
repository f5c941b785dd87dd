//! Evaluation summary for the trained models
//!
//! Training writes one CSV row per model with its held-out accuracy,
//! precision and F1 score (percentages). The summary is display-only and
//! never influences prediction.

use cropwise_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Model name shown when no summary has been recorded
pub const NO_DATA: &str = "No Data";

/// One row of the evaluation summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    #[serde(rename = "Model")]
    pub model: String,

    #[serde(rename = "Accuracy")]
    pub accuracy: f64,

    #[serde(rename = "Precision")]
    pub precision: f64,

    #[serde(rename = "F1_Score")]
    pub f1_score: f64,
}

impl ModelEvaluation {
    /// Placeholder row for a missing summary
    pub fn no_data() -> Self {
        Self {
            model: NO_DATA.to_string(),
            accuracy: 0.0,
            precision: 0.0,
            f1_score: 0.0,
        }
    }

    fn rounded(self) -> Self {
        Self {
            accuracy: round2(self.accuracy),
            precision: round2(self.precision),
            f1_score: round2(self.f1_score),
            ..self
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse a `Model,Accuracy,Precision,F1_Score` CSV, rounding scores to two decimals.
///
/// Extra columns are ignored.
pub fn parse_summary(name: &str, bytes: &[u8]) -> Result<Vec<ModelEvaluation>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    reader
        .deserialize::<ModelEvaluation>()
        .map(|row| {
            row.map(ModelEvaluation::rounded)
                .map_err(|e| Error::artifact(format!("{}: {}", name, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rounds_scores() {
        let csv = b"Model,Accuracy,Precision,F1_Score\nNaive Bayes,99.5454,99.5612,99.5\n";
        let rows = parse_summary("model_metrics.csv", csv).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].model, "Naive Bayes");
        assert_eq!(rows[0].accuracy, 99.55);
        assert_eq!(rows[0].precision, 99.56);
        assert_eq!(rows[0].f1_score, 99.5);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = b"Model,Accuracy,Precision,Recall,F1_Score\nSVM,97.1,97.3,96.9,97.0\n";
        let rows = parse_summary("model_metrics.csv", csv).unwrap();
        assert_eq!(rows[0].f1_score, 97.0);
    }

    #[test]
    fn test_non_numeric_score_is_artifact_error() {
        let csv = b"Model,Accuracy,Precision,F1_Score\nSVM,high,97.3,97.0\n";
        let err = parse_summary("model_metrics.csv", csv).unwrap_err();
        assert!(matches!(err, Error::Artifact(_)));
        assert!(err.to_string().contains("model_metrics.csv"));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(ModelEvaluation::no_data()).unwrap();
        assert_eq!(json["Model"], "No Data");
        assert_eq!(json["F1_Score"], 0.0);
    }
}
