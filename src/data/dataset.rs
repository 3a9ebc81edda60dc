//! Built-in Breast Cancer Wisconsin (Diagnostic) dataset

use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::debug;

use super::{frame_to_array2, series_to_array1, series_to_vec};
use crate::error::{CardError, Result};

/// Feature column names, in storage order
pub const FEATURE_NAMES: [&str; 30] = [
    "mean radius",
    "mean texture",
    "mean perimeter",
    "mean area",
    "mean smoothness",
    "mean compactness",
    "mean concavity",
    "mean concave points",
    "mean symmetry",
    "mean fractal dimension",
    "radius error",
    "texture error",
    "perimeter error",
    "area error",
    "smoothness error",
    "compactness error",
    "concavity error",
    "concave points error",
    "symmetry error",
    "fractal dimension error",
    "worst radius",
    "worst texture",
    "worst perimeter",
    "worst area",
    "worst smoothness",
    "worst compactness",
    "worst concavity",
    "worst concave points",
    "worst symmetry",
    "worst fractal dimension",
];

/// Class names indexed by label value
pub const TARGET_NAMES: [&str; 2] = ["malignant", "benign"];

/// Name of the label series
pub const TARGET_COLUMN: &str = "target";

/// A feature table plus its label series
#[derive(Debug, Clone)]
pub struct TabularDataset {
    /// One f64 column per feature
    pub features: DataFrame,
    /// Class labels (0.0 or 1.0), one per row
    pub target: Series,
    /// Human-readable class names
    pub target_names: Vec<String>,
}

impl TabularDataset {
    /// Build a dataset, checking that features and labels line up
    pub fn new(features: DataFrame, target: Series, target_names: Vec<String>) -> Result<Self> {
        if features.height() != target.len() {
            return Err(CardError::ShapeError {
                expected: format!("{} labels", features.height()),
                actual: format!("{} labels", target.len()),
            });
        }
        Ok(Self {
            features,
            target,
            target_names,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.features.height()
    }

    pub fn n_features(&self) -> usize {
        self.features.width()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Row-major feature matrix
    pub fn feature_matrix(&self) -> Result<Array2<f64>> {
        frame_to_array2(&self.features)
    }

    pub fn target_vector(&self) -> Result<Array1<f64>> {
        series_to_array1(&self.target)
    }

    /// Values of a single feature column
    pub fn feature_column(&self, name: &str) -> Result<Vec<f64>> {
        let column = self
            .features
            .column(name)
            .map_err(|_| CardError::FeatureNotFound(name.to_string()))?;
        series_to_vec(column.as_materialized_series())
    }
}

/// Load the Breast Cancer Wisconsin (Diagnostic) dataset: 569 rows, 30 features.
///
/// Label 0 is malignant, 1 is benign.
pub fn load_breast_cancer() -> Result<TabularDataset> {
    let raw = smartcore::dataset::breast_cancer::load_dataset();
    let values: Vec<f64> = raw.data.iter().map(|&v| v as f64).collect();
    let labels: Vec<f64> = raw.target.iter().map(|&t| t as f64).collect();

    let dataset = from_row_major(&values, &labels, raw.num_samples, raw.num_features)?;
    debug!(
        rows = dataset.n_rows(),
        features = dataset.n_features(),
        "loaded breast cancer dataset"
    );
    Ok(dataset)
}

/// Lay a row-major value buffer out as named feature columns.
///
/// Any disagreement between the buffer lengths, the declared shape and
/// [`FEATURE_NAMES`] is a `DataError`.
fn from_row_major(
    values: &[f64],
    labels: &[f64],
    n_rows: usize,
    n_features: usize,
) -> Result<TabularDataset> {
    if n_features != FEATURE_NAMES.len() {
        return Err(CardError::DataError(format!(
            "bundled data declares {} features, expected {}",
            n_features,
            FEATURE_NAMES.len()
        )));
    }
    if values.len() != n_rows * n_features || labels.len() != n_rows {
        return Err(CardError::DataError(format!(
            "bundled data holds {} values and {} labels for {} x {} table",
            values.len(),
            labels.len(),
            n_rows,
            n_features
        )));
    }

    let columns: Vec<Column> = FEATURE_NAMES
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let column: Vec<f64> = (0..n_rows).map(|i| values[i * n_features + j]).collect();
            Series::new((*name).into(), column).into()
        })
        .collect();
    let features = DataFrame::new(columns)?;
    let target = Series::new(TARGET_COLUMN.into(), labels.to_vec());

    TabularDataset::new(
        features,
        target,
        TARGET_NAMES.iter().map(|s| s.to_string()).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breast_cancer_shape() {
        let dataset = load_breast_cancer().unwrap();
        assert_eq!(dataset.n_rows(), 569);
        assert_eq!(dataset.n_features(), 30);
        assert_eq!(dataset.target.len(), 569);

        let names = dataset.feature_names();
        assert_eq!(names.len(), 30);
        assert_eq!(names[0], "mean radius");
        assert_eq!(names[29], "worst fractal dimension");
    }

    #[test]
    fn test_row_major_layout() {
        let values: Vec<f64> = (0..60).map(|v| v as f64).collect();
        let dataset = from_row_major(&values, &[0.0, 1.0], 2, 30).unwrap();
        assert_eq!(dataset.feature_column("mean radius").unwrap(), vec![0.0, 30.0]);
        assert_eq!(dataset.feature_column("mean texture").unwrap(), vec![1.0, 31.0]);
    }

    #[test]
    fn test_bundled_shape_mismatch_is_data_error() {
        let values = vec![0.0; 60];
        let wrong_width = from_row_major(&values, &[0.0, 1.0], 2, 29);
        assert!(matches!(wrong_width, Err(CardError::DataError(_))));

        let short_labels = from_row_major(&values, &[0.0], 2, 30);
        assert!(matches!(short_labels, Err(CardError::DataError(_))));

        let short_values = from_row_major(&values[..59], &[0.0, 1.0], 2, 30);
        assert!(matches!(short_values, Err(CardError::DataError(_))));
    }

    #[test]
    fn test_breast_cancer_labels_are_binary() {
        let dataset = load_breast_cancer().unwrap();
        let y = dataset.target_vector().unwrap();
        assert!(y.iter().all(|&v| v == 0.0 || v == 1.0));

        let benign = y.iter().filter(|&&v| v == 1.0).count();
        assert_eq!(benign, 357);
    }

    #[test]
    fn test_feature_column_lookup() {
        let dataset = load_breast_cancer().unwrap();
        let radius = dataset.feature_column("mean radius").unwrap();
        assert_eq!(radius.len(), 569);
        assert!(radius.iter().all(|&r| r > 0.0));

        let err = dataset.feature_column("mean colour").unwrap_err();
        assert!(matches!(err, CardError::FeatureNotFound(_)));
    }

    #[test]
    fn test_mismatched_labels_rejected() {
        let features = df!("a" => &[1.0, 2.0, 3.0]).unwrap();
        let target = Series::new("target".into(), vec![0.0, 1.0]);
        let result = TabularDataset::new(features, target, vec![]);
        assert!(matches!(result, Err(CardError::ShapeError { .. })));
    }
}
