//! Regression tree used as the boosting base learner

use crate::error::{CardError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Adjacent feature values closer than this are treated as equal.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf {
        leaf_id: usize,
        value: f64,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        improvement: f64,
    },
}

/// CART regression tree minimising squared error.
///
/// Split quality is Friedman's improvement `n_l * n_r / n * (mean_l - mean_r)^2`.
/// Leaves are numbered left to right so that a booster can overwrite their
/// values after fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    n_features: usize,
    n_leaves: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    improvement: f64,
}

impl RegressionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            n_features: 0,
            n_leaves: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Fit the tree on all rows
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let rows: Vec<usize> = (0..x.nrows()).collect();
        self.fit_rows(x, y, &rows)
    }

    /// Fit the tree on the given subset of rows
    pub fn fit_rows(&mut self, x: &Array2<f64>, y: &Array1<f64>, rows: &[usize]) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(CardError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if rows.is_empty() {
            return Err(CardError::ValidationError(
                "cannot fit a tree on zero samples".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 || self.min_samples_split < 2 {
            return Err(CardError::InvalidParameter {
                name: "min_samples_leaf/min_samples_split".to_string(),
                value: format!("{}/{}", self.min_samples_leaf, self.min_samples_split),
                reason: "need min_samples_leaf >= 1 and min_samples_split >= 2".to_string(),
            });
        }

        self.n_features = x.ncols();
        let mut importances = vec![0.0; self.n_features];
        let mut next_leaf = 0;
        self.root = Some(self.build_tree(x, y, rows, 0, &mut importances, &mut next_leaf));
        self.n_leaves = next_leaf;

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        next_leaf: &mut usize,
    ) -> TreeNode {
        let n_samples = indices.len();
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n_samples as f64;

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || Self::is_pure(y, indices);

        let split = if should_stop {
            None
        } else {
            self.find_best_split(x, y, indices)
        };

        match split {
            Some(best) => {
                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, best.feature_idx]] <= best.threshold);

                importances[best.feature_idx] += best.improvement;

                let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, importances, next_leaf));
                let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, importances, next_leaf));

                TreeNode::Split {
                    feature_idx: best.feature_idx,
                    threshold: best.threshold,
                    left,
                    right,
                    n_samples,
                    improvement: best.improvement,
                }
            }
            None => {
                let leaf_id = *next_leaf;
                *next_leaf += 1;
                TreeNode::Leaf {
                    leaf_id,
                    value: mean,
                    n_samples,
                }
            }
        }
    }

    fn find_best_split(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let parent_proxy = total_sum * total_sum / n as f64;
        let min_leaf = self.min_samples_leaf;

        // Each feature independently sweeps its sorted values
        (0..x.ncols())
            .into_par_iter()
            .filter_map(|feature_idx| {
                let mut order = indices.to_vec();
                order.sort_by(|&a, &b| {
                    x[[a, feature_idx]]
                        .partial_cmp(&x[[b, feature_idx]])
                        .unwrap_or(Ordering::Equal)
                });

                let mut left_sum = 0.0;
                let mut best: Option<SplitCandidate> = None;

                for k in 0..n - 1 {
                    left_sum += y[order[k]];
                    let left_n = k + 1;
                    let right_n = n - left_n;

                    let current = x[[order[k], feature_idx]];
                    let next = x[[order[k + 1], feature_idx]];
                    if next <= current + FEATURE_THRESHOLD {
                        continue;
                    }
                    if left_n < min_leaf || right_n < min_leaf {
                        continue;
                    }

                    let right_sum = total_sum - left_sum;
                    let proxy = left_sum * left_sum / left_n as f64 + right_sum * right_sum / right_n as f64;
                    let improvement = proxy - parent_proxy;

                    if improvement > best.as_ref().map_or(0.0, |b| b.improvement) {
                        best = Some(SplitCandidate {
                            feature_idx,
                            threshold: (current + next) / 2.0,
                            improvement,
                        });
                    }
                }
                best
            })
            .max_by(|a, b| {
                a.improvement
                    .partial_cmp(&b.improvement)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| b.feature_idx.cmp(&a.feature_idx))
            })
    }

    fn is_pure(y: &Array1<f64>, indices: &[usize]) -> bool {
        let first = y[indices[0]];
        indices.iter().all(|&i| (y[i] - first).abs() < 1e-12)
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(CardError::ModelNotFitted)?;
        self.check_width(x)?;
        Ok(x.rows()
            .into_iter()
            .map(|row| Self::find_leaf(root, row).1)
            .collect())
    }

    /// Leaf id reached by each row
    pub fn apply(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let root = self.root.as_ref().ok_or(CardError::ModelNotFitted)?;
        self.check_width(x)?;
        Ok(x.rows()
            .into_iter()
            .map(|row| Self::find_leaf(root, row).0)
            .collect())
    }

    /// Overwrite leaf values, indexed by leaf id
    pub fn set_leaf_values(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.n_leaves {
            return Err(CardError::ShapeError {
                expected: format!("{} leaf values", self.n_leaves),
                actual: format!("{} leaf values", values.len()),
            });
        }
        let root = self.root.as_mut().ok_or(CardError::ModelNotFitted)?;
        Self::assign_leaves(root, values);
        Ok(())
    }

    fn assign_leaves(node: &mut TreeNode, values: &[f64]) {
        match node {
            TreeNode::Leaf { leaf_id, value, .. } => *value = values[*leaf_id],
            TreeNode::Split { left, right, .. } => {
                Self::assign_leaves(left, values);
                Self::assign_leaves(right, values);
            }
        }
    }

    /// (leaf id, leaf value) reached by one row
    fn find_leaf(node: &TreeNode, row: ArrayView1<f64>) -> (usize, f64) {
        match node {
            TreeNode::Leaf { leaf_id, value, .. } => (*leaf_id, *value),
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if row[*feature_idx] <= *threshold {
                    Self::find_leaf(left, row)
                } else {
                    Self::find_leaf(right, row)
                }
            }
        }
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(CardError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        self.n_leaves
    }
}
