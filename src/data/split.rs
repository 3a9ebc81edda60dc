//! Random train/test partitioning

use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{frame_to_array2, series_to_array1, series_to_vec, TabularDataset};
use crate::error::{CardError, Result};

/// One side of a split, with the source rows it was taken from
#[derive(Debug, Clone)]
pub struct Partition {
    pub features: DataFrame,
    pub target: Series,
    /// Row indices into the original dataset, in partition order
    pub row_indices: Vec<usize>,
}

impl Partition {
    fn take(dataset: &TabularDataset, row_indices: Vec<usize>) -> Result<Self> {
        let idx = IdxCa::from_vec(
            "idx".into(),
            row_indices.iter().map(|&i| i as IdxSize).collect(),
        );
        Ok(Self {
            features: dataset.features.take(&idx)?,
            target: dataset.target.take(&idx)?,
            row_indices,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.features.height()
    }

    pub fn n_features(&self) -> usize {
        self.features.width()
    }

    pub fn feature_matrix(&self) -> Result<Array2<f64>> {
        frame_to_array2(&self.features)
    }

    pub fn target_vector(&self) -> Result<Array1<f64>> {
        series_to_array1(&self.target)
    }

    pub fn feature_column(&self, name: &str) -> Result<Vec<f64>> {
        let column = self
            .features
            .column(name)
            .map_err(|_| CardError::FeatureNotFound(name.to_string()))?;
        series_to_vec(column.as_materialized_series())
    }
}

/// Disjoint train and test partitions of one dataset
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Partition,
    pub test: Partition,
}

/// Shuffle rows and hold out `ceil(test_size * n)` of them for testing.
///
/// Without `random_state` the shuffle is seeded from OS entropy, so each call
/// produces a different partition.
pub fn train_test_split(
    dataset: &TabularDataset,
    test_size: f64,
    random_state: Option<u64>,
) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(CardError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be strictly between 0 and 1".to_string(),
        });
    }

    let n_samples = dataset.n_rows();
    let n_test = (test_size * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(CardError::ValidationError(format!(
            "test_size {} on {} rows leaves {} train and {} test rows",
            test_size, n_samples, n_train, n_test
        )));
    }

    let mut rng = match random_state {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(&mut rng);

    let train_indices = indices.split_off(n_test);
    let test_indices = indices;

    Ok(TrainTestSplit {
        train: Partition::take(dataset, train_indices)?,
        test: Partition::take(dataset, test_indices)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn small_dataset(n: usize) -> TabularDataset {
        let f1: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let f2: Vec<f64> = (0..n).map(|i| (i * 2) as f64).collect();
        let target: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        TabularDataset::new(
            df!("f1" => &f1, "f2" => &f2).unwrap(),
            Series::new("target".into(), target),
            vec!["a".to_string(), "b".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_default_proportions() {
        let dataset = small_dataset(569);
        let split = train_test_split(&dataset, 0.25, Some(0)).unwrap();
        assert_eq!(split.test.n_rows(), 143);
        assert_eq!(split.train.n_rows(), 426);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let dataset = small_dataset(100);
        let split = train_test_split(&dataset, 0.3, None).unwrap();

        let train: HashSet<usize> = split.train.row_indices.iter().copied().collect();
        let test: HashSet<usize> = split.test.row_indices.iter().copied().collect();
        assert!(train.is_disjoint(&test));

        let all: HashSet<usize> = train.union(&test).copied().collect();
        assert_eq!(all, (0..100).collect::<HashSet<usize>>());
    }

    #[test]
    fn test_rows_follow_their_indices() {
        let dataset = small_dataset(20);
        let split = train_test_split(&dataset, 0.25, Some(7)).unwrap();

        let f1 = split.test.feature_column("f1").unwrap();
        let y = split.test.target_vector().unwrap();
        for (pos, &row) in split.test.row_indices.iter().enumerate() {
            assert_eq!(f1[pos], row as f64);
            assert_eq!(y[pos], (row % 2) as f64);
        }
    }

    #[test]
    fn test_seed_makes_split_reproducible() {
        let dataset = small_dataset(50);
        let a = train_test_split(&dataset, 0.25, Some(42)).unwrap();
        let b = train_test_split(&dataset, 0.25, Some(42)).unwrap();
        assert_eq!(a.test.row_indices, b.test.row_indices);
    }

    #[test]
    fn test_invalid_test_size() {
        let dataset = small_dataset(10);
        for bad in [0.0, 1.0, -0.5, f64::NAN] {
            let result = train_test_split(&dataset, bad, None);
            assert!(matches!(result, Err(CardError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn test_split_too_small() {
        let dataset = small_dataset(1);
        let result = train_test_split(&dataset, 0.5, None);
        assert!(matches!(result, Err(CardError::ValidationError(_))));
    }
}
