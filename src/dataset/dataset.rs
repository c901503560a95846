//! Encoded training dataset.
//!
//! A [`Dataset`] is the fully numeric form of a cleaned table: a feature
//! matrix whose columns follow the training schema, and a vector of class
//! codes produced by the label codec.

use crate::core::error::{PipelineError, Result};
use crate::core::types::{ClassIndex, FeatureValue};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Numeric feature matrix with class labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Feature matrix (num_data x num_features)
    features: Array2<FeatureValue>,
    /// Class code per row
    labels: Array1<ClassIndex>,
    /// Column names in matrix order
    feature_names: Vec<String>,
    /// Number of classes known to the label codec
    num_classes: usize,
}

impl Dataset {
    /// Create a new dataset, validating shapes and label range.
    pub fn new(
        features: Array2<FeatureValue>,
        labels: Array1<ClassIndex>,
        feature_names: Vec<String>,
        num_classes: usize,
    ) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(crate::dataset_error!(
                "feature rows ({}) and labels ({}) differ",
                features.nrows(),
                labels.len()
            ));
        }

        if features.ncols() != feature_names.len() {
            return Err(crate::dataset_error!(
                "feature columns ({}) and feature names ({}) differ",
                features.ncols(),
                feature_names.len()
            ));
        }

        if let Some(&label) = labels.iter().find(|&&label| label >= num_classes) {
            return Err(PipelineError::out_of_range("label", label, num_classes));
        }

        Ok(Dataset {
            features,
            labels,
            feature_names,
            num_classes,
        })
    }

    /// Number of rows
    pub fn num_data(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    /// Number of classes known to the label codec
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Feature matrix view
    pub fn features(&self) -> ArrayView2<'_, FeatureValue> {
        self.features.view()
    }

    /// One feature row
    pub fn row(&self, index: usize) -> ArrayView1<'_, FeatureValue> {
        self.features.row(index)
    }

    /// Class codes
    pub fn labels(&self) -> ArrayView1<'_, ClassIndex> {
        self.labels.view()
    }

    /// Feature names in column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Rows per class code
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_classes];
        for &label in self.labels.iter() {
            counts[label] += 1;
        }
        counts
    }

    /// Number of classes with at least one row
    pub fn num_distinct_classes(&self) -> usize {
        self.class_counts().iter().filter(|&&count| count > 0).count()
    }

    /// Create a subset of the dataset with the specified row indices
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&index) = indices.iter().find(|&&index| index >= self.num_data()) {
            return Err(crate::dataset_error!(
                "row index {} out of bounds for {} rows",
                index,
                self.num_data()
            ));
        }

        Ok(Dataset {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
            num_classes: self.num_classes,
        })
    }
}
