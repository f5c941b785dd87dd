//! Soil-aware candidate generation

use crate::config::FilterConfig;
use crate::constraints::ConstraintTable;
use cropwise_classifiers::LabelEncoder;
use cropwise_core::{Candidate, Error, Result, SoilType, Stage};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Turns a probability vector into soil-compatible, ranked candidates
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    constraints: Arc<ConstraintTable>,
    top_k: usize,
    max_candidates: usize,
}

impl CandidateFilter {
    pub fn new(constraints: Arc<ConstraintTable>, config: &FilterConfig) -> Self {
        Self {
            constraints,
            top_k: config.top_k,
            max_candidates: config.max_candidates,
        }
    }

    /// Constraint table used for filtering
    pub fn constraints(&self) -> &ConstraintTable {
        &self.constraints
    }

    /// Rank, decode, soil-filter and truncate.
    ///
    /// `model` only labels errors. An empty result is valid and means no
    /// top-ranked crop tolerates the soil.
    pub fn filter(
        &self,
        model: &str,
        probabilities: &[f64],
        soil: SoilType,
        encoder: &LabelEncoder,
    ) -> Result<Vec<Candidate>> {
        let ranked = top_indices(probabilities, self.top_k)
            .into_iter()
            .map(|index| {
                let crop = encoder.decode(index).ok_or_else(|| {
                    Error::inference(
                        model,
                        Stage::Decode,
                        format!(
                            "class index {} is not in the label encoder ({} classes)",
                            index,
                            encoder.len()
                        ),
                    )
                })?;
                Ok(Candidate::new(crop, probabilities[index]))
            })
            .collect::<Result<Vec<_>>>()?;

        let considered = ranked.len();
        let kept = self.retain_compatible(ranked, soil);
        debug!(model, soil = %soil, considered, kept = kept.len(), "Filtered candidates");
        Ok(kept)
    }

    /// Drop candidates the soil rules out and keep at most `max_candidates`.
    ///
    /// Order is preserved, so applying this twice changes nothing.
    pub fn retain_compatible(&self, candidates: Vec<Candidate>, soil: SoilType) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|c| self.constraints.allows(&c.crop, soil))
            .take(self.max_candidates)
            .collect()
    }
}

/// Indices of the `k` largest probabilities, highest first.
///
/// The sort is stable, so equal probabilities keep class-index order; NaN
/// sorts after every number.
pub fn top_indices(probabilities: &[f64], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..probabilities.len()).collect();
    indices.sort_by(|a, b| descending(probabilities[*a], probabilities[*b]));
    indices.truncate(k);
    indices
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> CandidateFilter {
        CandidateFilter::new(Arc::new(ConstraintTable::builtin()), &FilterConfig::default())
    }

    #[test]
    fn test_top_indices_orders_and_truncates() {
        let probs = [0.1, 0.4, f64::NAN, 0.4, 0.05];
        assert_eq!(top_indices(&probs, 3), vec![1, 3, 0]);
        assert_eq!(top_indices(&probs, 10), vec![1, 3, 0, 4, 2]);
    }

    #[test]
    fn test_unknown_index_is_decode_error() {
        let encoder = LabelEncoder::from_classes(["rice"]).unwrap();
        let err = filter()
            .filter("SVM", &[0.2, 0.8], SoilType::Loamy, &encoder)
            .unwrap_err();

        match err {
            Error::Inference { model, stage, .. } => {
                assert_eq!(model, "SVM");
                assert_eq!(stage, Stage::Decode);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_keeps_at_most_max_candidates() {
        let encoder = LabelEncoder::from_classes((0..8).map(|i| format!("unlisted{}", i))).unwrap();
        let probs = [0.3, 0.2, 0.15, 0.1, 0.1, 0.05, 0.05, 0.05];
        let out = filter().filter("NB", &probs, SoilType::Red, &encoder).unwrap();

        let crops: Vec<_> = out.iter().map(|c| c.crop.as_str()).collect();
        assert_eq!(crops, ["unlisted0", "unlisted1", "unlisted2", "unlisted3", "unlisted4"]);
    }
}
