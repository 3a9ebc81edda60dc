//! Pipeline configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CardError, Result};
use crate::training::GradientBoostingConfig;
use crate::visualization::PlotConfig;

/// Configuration for one model card run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root for `data/` and `model_cards/`
    pub assets_dir: PathBuf,

    /// Jinja template used to render the card
    pub template_path: PathBuf,

    /// File name of the rendered card inside `model_cards/`
    pub output_file: String,

    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the split (None = fresh entropy every run)
    pub random_state: Option<u64>,

    pub boosting: GradientBoostingConfig,

    pub plot: PlotConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("."),
            template_path: PathBuf::from("template/html/my_template.html.jinja"),
            output_file: "model_card.html".to_string(),
            test_size: 0.25,
            random_state: None,
            boosting: GradientBoostingConfig::default(),
            plot: PlotConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON config; absent fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            CardError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            CardError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    pub fn with_output_file(mut self, name: impl Into<String>) -> Self {
        self.output_file = name.into();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn with_boosting(mut self, boosting: GradientBoostingConfig) -> Self {
        self.boosting = boosting;
        self
    }

    pub fn with_plot_size(mut self, width: u32, height: u32) -> Self {
        self.plot = PlotConfig { width, height };
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(CardError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be in (0, 1)".to_string(),
            });
        }
        let output = Path::new(&self.output_file);
        if self.output_file.is_empty() || output.components().count() != 1 {
            return Err(CardError::ConfigError(format!(
                "output_file '{}' must be a bare file name",
                self.output_file
            )));
        }
        if self.template_path.as_os_str().is_empty() {
            return Err(CardError::ConfigError("template_path is empty".to_string()));
        }
        if self.plot.width < 200 || self.plot.height < 160 {
            return Err(CardError::ConfigError(format!(
                "plot size {}x{} is below the 200x160 minimum",
                self.plot.width, self.plot.height
            )));
        }
        self.boosting.validate()
    }
}
