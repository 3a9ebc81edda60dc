//! Dataset loading and partitioning
//!
//! Tables are held as polars frames and converted to ndarray for fitting.

mod dataset;
mod split;

pub use dataset::{load_breast_cancer, TabularDataset, FEATURE_NAMES, TARGET_COLUMN, TARGET_NAMES};
pub use split::{train_test_split, Partition, TrainTestSplit};

use crate::error::{CardError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Extract every column of a frame into a row-major `Array2<f64>`.
fn frame_to_array2(df: &DataFrame) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = df.width();

    let col_data: Vec<Vec<f64>> = df
        .get_columns()
        .iter()
        .map(|column| series_to_vec(column.as_materialized_series()))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]))
}

fn series_to_array1(series: &Series) -> Result<Array1<f64>> {
    Ok(Array1::from_vec(series_to_vec(series)?))
}

/// Cast to f64 and collect; nulls are rejected rather than filled.
fn series_to_vec(series: &Series) -> Result<Vec<f64>> {
    let series_f64 = series
        .cast(&DataType::Float64)
        .map_err(|e| CardError::DataError(e.to_string()))?;
    series_f64
        .f64()
        .map_err(|e| CardError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| CardError::DataError(format!("null value in column '{}'", series.name())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_to_array2_is_row_major() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0],
            "b" => &[10.0, 20.0, 30.0]
        )
        .unwrap();
        let x = frame_to_array2(&df).unwrap();
        assert_eq!(x.shape(), &[3, 2]);
        assert_eq!(x[[0, 1]], 10.0);
        assert_eq!(x[[2, 0]], 3.0);
    }

    #[test]
    fn test_integer_series_is_cast() {
        let s = Series::new("labels".into(), vec![0i32, 1, 1]);
        assert_eq!(series_to_vec(&s).unwrap(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_null_values_rejected() {
        let s = Series::new("x".into(), vec![Some(1.0), None]);
        assert!(matches!(series_to_vec(&s), Err(CardError::DataError(_))));
    }
}
