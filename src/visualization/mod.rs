//! Visualization module: charts rasterised to PNG and carried as base64.

pub mod canvas;
pub mod charts;
pub mod encode;
pub mod font;

pub use canvas::{generate_palette, Canvas};
pub use charts::{auto_bin_count, confusion_matrix_plot, distribution_plot, histogram_edges, roc_plot};
pub use encode::{decode_base64, encode_png_base64, is_png, PNG_SIGNATURE};

use serde::{Deserialize, Serialize};

/// Pixel size of every rendered chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self { width: 640, height: 480 }
    }
}
