//! Estimators that can be serialized into a model artifact.
//!
//! The artifact stores fitted parameters only; evaluation is implemented
//! here so it behaves like the estimator it was exported from.

use serde::{Deserialize, Serialize};

use super::ArtifactError;

/// A fitted binary estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl Estimator {
    /// Short name for status displays and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::RandomForest(_) => "random_forest",
        }
    }

    /// Check parameter shapes against the number of input features.
    pub(super) fn validate(&self, n_features: usize) -> Result<(), ArtifactError> {
        match self {
            Self::LogisticRegression(m) => m.validate(n_features),
            Self::RandomForest(m) => m.validate(n_features),
        }
    }

    /// Positive-class probability for one aligned feature row.
    #[must_use]
    pub fn positive_probability(&self, x: &[f64]) -> f64 {
        match self {
            Self::LogisticRegression(m) => m.positive_probability(x),
            Self::RandomForest(m) => m.positive_probability(x),
        }
    }
}

/// Standardization applied before the linear term: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Logistic regression with an optional fitted scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<StandardScaler>,
}

impl LogisticRegression {
    fn validate(&self, n: usize) -> Result<(), ArtifactError> {
        if self.coefficients.len() != n {
            return Err(ArtifactError::Corrupt(format!(
                "logistic_regression has {} coefficients for {n} features",
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(ArtifactError::Corrupt(
                "logistic_regression parameters must be finite".into(),
            ));
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(ArtifactError::Corrupt(
                    "scaler parameter lengths do not match feature count".into(),
                ));
            }
            if scaler.mean.iter().any(|m| !m.is_finite())
                || scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0)
            {
                return Err(ArtifactError::Corrupt(
                    "scaler mean must be finite and scale finite and non-zero".into(),
                ));
            }
        }
        Ok(())
    }

    /// Linear decision value `w·x + b` after scaling.
    #[must_use]
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        let dot: f64 = match &self.scaler {
            Some(s) => x
                .iter()
                .zip(&self.coefficients)
                .zip(s.mean.iter().zip(&s.scale))
                .map(|((xi, w), (m, sd))| w * (xi - m) / sd)
                .sum(),
            None => x.iter().zip(&self.coefficients).map(|(xi, w)| w * xi).sum(),
        };
        dot + self.intercept
    }

    fn positive_probability(&self, x: &[f64]) -> f64 {
        sigmoid(self.decision_function(x))
    }
}

/// Logistic function, stable for large |z|.
#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// One node of a flattened decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class probabilities at this leaf.
    Leaf { proba: [f64; 2] },
}

/// A decision tree stored as a node array rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n: usize, tree_idx: usize) -> Result<(), ArtifactError> {
        if self.nodes.is_empty() {
            return Err(ArtifactError::Corrupt(format!("tree {tree_idx} has no nodes")));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n {
                        return Err(ArtifactError::Corrupt(format!(
                            "tree {tree_idx} node {i} splits on feature {feature} of {n}"
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(ArtifactError::Corrupt(format!(
                            "tree {tree_idx} node {i} has a NaN threshold"
                        )));
                    }
                    // Children must point forward so traversal always terminates.
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(ArtifactError::Corrupt(format!(
                                "tree {tree_idx} node {i} has invalid child {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { proba } => {
                    let valid = proba.iter().all(|p| p.is_finite() && *p >= 0.0)
                        && proba.iter().sum::<f64>() > 0.0;
                    if !valid {
                        return Err(ArtifactError::Corrupt(format!(
                            "tree {tree_idx} node {i} has invalid leaf probabilities"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf(&self, x: &[f64]) -> [f64; 2] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if x[*feature] <= *threshold { *left } else { *right },
                TreeNode::Leaf { proba } => {
                    let total = proba[0] + proba[1];
                    return [proba[0] / total, proba[1] / total];
                }
            }
        }
    }
}

/// Bagged decision trees; probabilities are averaged across trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn validate(&self, n: usize) -> Result<(), ArtifactError> {
        if self.trees.is_empty() {
            return Err(ArtifactError::Corrupt("random_forest has no trees".into()));
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.validate(n, i))
    }

    fn positive_probability(&self, x: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.leaf(x)[1]).sum();
        sum / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    proba: [1.0 - low, low],
                },
                TreeNode::Leaf {
                    proba: [1.0 - high, high],
                },
            ],
        }
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < f64::EPSILON);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_with_scaler() {
        let model = LogisticRegression {
            coefficients: vec![2.0, -1.0],
            intercept: 0.5,
            scaler: Some(StandardScaler {
                mean: vec![10.0, 0.0],
                scale: vec![5.0, 1.0],
            }),
        };
        // (20 - 10) / 5 * 2 - 1 * 1 + 0.5 = 3.5
        assert!((model.decision_function(&[20.0, 1.0]) - 3.5).abs() < 1e-12);
        let p = Estimator::LogisticRegression(model).positive_probability(&[20.0, 1.0]);
        assert!((p - sigmoid(3.5)).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_shape_validation() {
        let model = LogisticRegression {
            coefficients: vec![1.0],
            intercept: 0.0,
            scaler: None,
        };
        assert!(model.validate(1).is_ok());
        assert!(model.validate(2).is_err());

        let zero_scale = LogisticRegression {
            scaler: Some(StandardScaler {
                mean: vec![0.0],
                scale: vec![0.0],
            }),
            ..model
        };
        assert!(zero_scale.validate(1).is_err());
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = RandomForest {
            trees: vec![stump(0, 5.0, 0.2, 0.8), stump(1, 0.5, 0.0, 1.0)],
        };
        assert!(forest.validate(2).is_ok());

        let est = Estimator::RandomForest(forest);
        assert!((est.positive_probability(&[1.0, 0.0]) - 0.1).abs() < 1e-12);
        assert!((est.positive_probability(&[9.0, 1.0]) - 0.9).abs() < 1e-12);
        // Threshold is inclusive on the left branch.
        assert!((est.positive_probability(&[5.0, 1.0]) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_forest_rejects_cycles_and_bad_features() {
        let cyclic = DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 0,
                    right: 1,
                },
                TreeNode::Leaf { proba: [0.5, 0.5] },
            ],
        };
        assert!(cyclic.validate(1, 0).is_err());
        assert!(stump(3, 1.0, 0.1, 0.9).validate(2, 0).is_err());
        assert!(RandomForest { trees: vec![] }.validate(2).is_err());
    }

    #[test]
    fn test_estimator_json_tagging() {
        let json = r#"{"model_type":"random_forest","trees":[{"nodes":[
            {"kind":"leaf","proba":[0.25,0.75]}]}]}"#;
        let est: Estimator = serde_json::from_str(json).expect("parse");
        assert_eq!(est.kind(), "random_forest");
        assert!((est.positive_probability(&[]) - 0.75).abs() < 1e-12);
    }
}
