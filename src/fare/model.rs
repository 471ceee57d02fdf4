//! Serialized regression model and its scoring
//!
//! The artifact is produced by an external training pipeline as JSON. It names
//! the feature columns it was trained on; scoring refuses a record whose
//! schema differs.

use serde::{Deserialize, Serialize};

use super::features::{FEATURE_COLUMNS, FareFeatures};
use crate::{FareError, Result};

/// Artifact format version understood by this build
pub const SUPPORTED_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareModel {
    pub version: u32,
    /// Training column names, in order
    pub features: Vec<String>,
    pub regressor: Regressor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    TreeEnsemble {
        #[serde(default)]
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        trees: Vec<Tree>,
    },
}

/// How tree outputs combine: boosted ensembles add, forests average
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    /// Node 0 is the root
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go `left` when `x[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl FareModel {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Check that the artifact was trained on exactly our ten columns, in order
    pub fn check_schema(&self) -> Result<()> {
        if self.version != SUPPORTED_VERSION {
            return Err(FareError::prediction(format!(
                "unsupported model version {} (expected {SUPPORTED_VERSION})",
                self.version
            )));
        }

        if self.features.len() != FEATURE_COLUMNS.len()
            || self
                .features
                .iter()
                .zip(FEATURE_COLUMNS)
                .any(|(trained, ours)| trained != ours)
        {
            return Err(FareError::prediction(format!(
                "feature schema mismatch: model expects [{}], input has [{}]",
                self.features.join(", "),
                FEATURE_COLUMNS.join(", ")
            )));
        }

        Ok(())
    }

    pub fn predict(&self, features: &FareFeatures) -> Result<f64> {
        self.check_schema()?;

        let fare = self.regressor.score(&features.values())?;
        if !fare.is_finite() {
            return Err(FareError::prediction("model produced a non-finite fare"));
        }
        Ok(fare)
    }
}

impl Regressor {
    fn score(&self, x: &[f64]) -> Result<f64> {
        match self {
            Regressor::Linear {
                intercept,
                coefficients,
            } => {
                if coefficients.len() != x.len() {
                    return Err(FareError::prediction(format!(
                        "model has {} coefficients for {} features",
                        coefficients.len(),
                        x.len()
                    )));
                }
                Ok(intercept + coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>())
            }
            Regressor::TreeEnsemble {
                aggregation,
                base_score,
                trees,
            } => {
                if trees.is_empty() {
                    return Err(FareError::prediction("tree ensemble has no trees"));
                }
                let mut total = 0.0;
                for tree in trees {
                    total += tree.evaluate(x)?;
                }
                let combined = match aggregation {
                    Aggregation::Sum => total,
                    Aggregation::Mean => total / trees.len() as f64,
                };
                Ok(base_score + combined)
            }
        }
    }
}

impl Tree {
    fn evaluate(&self, x: &[f64]) -> Result<f64> {
        let mut index = 0;
        // A root-to-leaf path visits each node at most once.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x.get(*feature).ok_or_else(|| {
                        FareError::prediction(format!("tree splits on unknown feature {feature}"))
                    })?;
                    index = if value <= threshold { *left } else { *right };
                }
                None => {
                    return Err(FareError::prediction(format!(
                        "tree references missing node {index}"
                    )));
                }
            }
        }
        Err(FareError::prediction("tree does not reach a leaf"))
    }
}
