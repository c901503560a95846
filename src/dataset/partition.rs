//! Seeded train/test partitioning.
//!
//! Rows are shuffled with a seeded [`StdRng`] and split so that
//! `ceil(test_fraction * n)` rows are held out. The same seed and row count
//! always yield the same partition.

use crate::core::error::{PipelineError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of the two sides of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Rows used to fit the classifier
    pub train: Vec<usize>,
    /// Rows held out for evaluation
    pub test: Vec<usize>,
}

impl Partition {
    /// Number of training rows
    pub fn num_train(&self) -> usize {
        self.train.len()
    }

    /// Number of held-out rows
    pub fn num_test(&self) -> usize {
        self.test.len()
    }
}

/// Number of rows held out for a given row count and fraction.
pub fn test_size(num_rows: usize, test_fraction: f64) -> usize {
    (test_fraction * num_rows as f64).ceil() as usize
}

/// Shuffle `0..num_rows` with `seed` and split off the test rows.
///
/// Fails when either side of the split would be empty.
pub fn train_test_split(num_rows: usize, test_fraction: f64, seed: u64) -> Result<Partition> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::invalid_parameter(
            "test_fraction",
            test_fraction.to_string(),
            "must be in range (0.0, 1.0)",
        ));
    }

    let num_test = test_size(num_rows, test_fraction);
    if num_test == 0 || num_test >= num_rows {
        return Err(crate::dataset_error!(
            "cannot split {} rows with test fraction {}: both sides need at least one row",
            num_rows, test_fraction
        ));
    }

    let mut indices: Vec<usize> = (0..num_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(num_test);
    log::debug!(
        "Partitioned {} rows into {} train / {} test (seed {})",
        num_rows,
        train.len(),
        indices.len(),
        seed
    );

    Ok(Partition {
        train,
        test: indices,
    })
}
