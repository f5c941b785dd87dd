//! Decision-forest classifier with probability leaves
//!
//! Trees are stored as flat node arrays rooted at index 0. A split sends
//! `x[feature] <= threshold` to `left`, everything else to `right`. Children
//! must come after their parent, which rules out cycles. Leaf class weights
//! are normalized at load time and averaged across trees at prediction time.

use crate::classifier::{ClassProbabilities, Classifier, ClassifierKind};
use async_trait::async_trait;
use cropwise_core::{Error, FeatureVector, Result, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// Serialized parameters of a forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    pub trees: Vec<TreeParams>,
}

/// One tree as a flat node list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeParams {
    pub nodes: Vec<NodeParams>,
}

/// Serialized tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeParams {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Class weights or counts at this leaf
        value: Vec<f64>,
    },
}

#[derive(Debug)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(Vec<f64>),
}

/// Forest classifier averaging leaf distributions
#[derive(Debug)]
pub struct ForestClassifier {
    name: String,
    trees: Vec<Vec<Node>>,
    n_classes: usize,
}

impl ForestClassifier {
    /// Build a classifier from exported parameters
    pub fn from_params(name: impl Into<String>, params: ForestParams, n_classes: usize) -> Result<Self> {
        if params.trees.is_empty() {
            return Err(Error::artifact("forest has no trees"));
        }

        let trees = params
            .trees
            .into_iter()
            .enumerate()
            .map(|(t, tree)| build_tree(t, tree, n_classes))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.into(),
            trees,
            n_classes,
        })
    }

    fn leaf_for<'a>(tree: &'a [Node], features: &FeatureVector) -> &'a [f64] {
        let mut index = 0;
        loop {
            match &tree[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[async_trait]
impl Classifier for ForestClassifier {
    async fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities> {
        let mut probs = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in probs.iter_mut().zip(Self::leaf_for(tree, features)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        probs.iter_mut().for_each(|p| *p /= n_trees);
        Ok(probs)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Forest
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}

fn build_tree(t: usize, tree: TreeParams, n_classes: usize) -> Result<Vec<Node>> {
    if tree.nodes.is_empty() {
        return Err(Error::artifact(format!("tree {} has no nodes", t)));
    }

    let n_nodes = tree.nodes.len();
    tree.nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| match node {
            NodeParams::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if feature >= FEATURE_COUNT {
                    return Err(Error::artifact(format!(
                        "tree {} node {} splits on feature {} (only {} features)",
                        t, i, feature, FEATURE_COUNT
                    )));
                }
                if left <= i || right <= i || left >= n_nodes || right >= n_nodes {
                    return Err(Error::artifact(format!(
                        "tree {} node {} has invalid children ({}, {})",
                        t, i, left, right
                    )));
                }
                Ok(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                })
            }
            NodeParams::Leaf { value } => {
                let total: f64 = value.iter().sum();
                if value.len() != n_classes || value.iter().any(|v| *v < 0.0) || total <= 0.0 {
                    return Err(Error::artifact(format!(
                        "tree {} leaf {} must hold {} non-negative weights with a positive sum",
                        t, i, n_classes
                    )));
                }
                Ok(Node::Leaf(value.into_iter().map(|v| v / total).collect()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64, low: Vec<f64>, high: Vec<f64>) -> TreeParams {
        TreeParams {
            nodes: vec![
                NodeParams::Split {
                    feature: 6,
                    threshold,
                    left: 1,
                    right: 2,
                },
                NodeParams::Leaf { value: low },
                NodeParams::Leaf { value: high },
            ],
        }
    }

    #[tokio::test]
    async fn test_averages_normalized_leaves() {
        let params = ForestParams {
            trees: vec![
                stump(100.0, vec![10.0, 0.0], vec![0.0, 10.0]),
                stump(150.0, vec![3.0, 1.0], vec![1.0, 3.0]),
            ],
        };
        let model = ForestClassifier::from_params("rf", params, 2).unwrap();

        // rainfall 120: tree 1 → high leaf [0, 1], tree 2 → low leaf [0.75, 0.25]
        let probs = model
            .predict_proba(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 120.0])
            .await
            .unwrap();
        assert!((probs[0] - 0.375).abs() < 1e-12);
        assert!((probs[1] - 0.625).abs() < 1e-12);
    }

    #[test]
    fn test_backward_child_rejected() {
        let params = ForestParams {
            trees: vec![TreeParams {
                nodes: vec![
                    NodeParams::Split {
                        feature: 0,
                        threshold: 1.0,
                        left: 0,
                        right: 1,
                    },
                    NodeParams::Leaf { value: vec![1.0] },
                ],
            }],
        };
        let err = ForestClassifier::from_params("rf", params, 1).unwrap_err();
        assert!(err.to_string().contains("invalid children"));
    }

    #[test]
    fn test_leaf_width_must_match_classes() {
        let params = ForestParams {
            trees: vec![stump(1.0, vec![1.0, 0.0], vec![1.0])],
        };
        assert!(ForestClassifier::from_params("rf", params, 2).is_err());
    }
}
