//! make-card - Model card generation for a gradient boosted classifier
//!
//! This crate trains a classifier on the Wisconsin breast cancer data and
//! documents it as a model card:
//! - Train/test partitioning of a polars feature table
//! - Gradient boosted regression trees with log-loss
//! - Distribution, ROC and confusion matrix charts as base64 PNGs
//! - A serde model card rendered through a Jinja template
//!
//! # Modules
//!
//! - [`data`] - Built-in dataset and random splitting
//! - [`training`] - Trees, boosting and evaluation metrics
//! - [`visualization`] - In-memory chart rasterisation
//! - [`export`] - Model card schema, JSON snapshots and rendering
//! - [`config`] - Pipeline configuration
//! - [`pipeline`] - End-to-end run
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

pub mod config;
pub mod data;
pub mod training;
pub mod visualization;
pub mod export;
pub mod pipeline;

// Services
pub mod cli;

pub use error::{CardError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{CardError, Result};

    pub use crate::config::PipelineConfig;
    pub use crate::data::{load_breast_cancer, train_test_split, TabularDataset, TrainTestSplit};
    pub use crate::training::{GradientBoostingClassifier, GradientBoostingConfig, RocCurve};
    pub use crate::visualization::PlotConfig;
    pub use crate::export::{ModelCard, ModelCardToolkit};
    pub use crate::pipeline::{run, CardReport};
}
