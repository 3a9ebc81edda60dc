//! Model training module
//!
//! Provides the pieces needed to fit and evaluate the card's classifier:
//! - Regression trees (base learners)
//! - Gradient boosted binary classification
//! - Accuracy, confusion matrix and ROC metrics

pub mod decision_tree;
pub mod gradient_boosting;
pub mod metrics;

pub use decision_tree::{RegressionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingClassifier, GradientBoostingConfig};
pub use metrics::{accuracy_score, confusion_matrix, roc_auc, roc_curve, round_to, ConfusionMatrix, RocCurve};
