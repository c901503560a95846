//! Core data types for the party prediction pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric feature value stored in the training matrix.
pub type FeatureValue = f64;

/// Dense class code produced by the label codec.
pub type ClassIndex = usize;

/// Category code produced by a feature codec.
pub type CategoryCode = usize;

/// Feature index type for identifying columns of the feature matrix.
pub type FeatureIndex = usize;

/// Tree node identifier type.
pub type NodeIndex = usize;

/// Kind of a column in the cleaned dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Every non-null cell parses as a number
    Numeric,
    /// Free-form strings, encoded through a codec
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Kind tag stored alongside every persisted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// A fitted categorical codec
    Codec,
    /// A fitted classifier with its training schema
    Model,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Codec => write!(f, "codec"),
            ArtifactKind::Model => write!(f, "model"),
        }
    }
}

/// Number of features considered at each tree split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// Square root of the feature count
    Sqrt,
    /// Base-2 logarithm of the feature count
    Log2,
    /// All features
    All,
    /// A fraction in `(0, 1]` of the feature count
    Fraction(f64),
}

impl MaxFeatures {
    /// Resolve to a concrete count for `num_features` columns, at least one.
    pub fn resolve(&self, num_features: usize) -> usize {
        let n = num_features as f64;
        let count = match self {
            MaxFeatures::Sqrt => n.sqrt().floor() as usize,
            MaxFeatures::Log2 => n.log2().floor() as usize,
            MaxFeatures::All => num_features,
            MaxFeatures::Fraction(fraction) => (n * fraction).floor() as usize,
        };
        count.clamp(1, num_features.max(1))
    }
}

impl Default for MaxFeatures {
    fn default() -> Self {
        MaxFeatures::Sqrt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(9), 3);
        assert_eq!(MaxFeatures::Sqrt.resolve(10), 3);
        assert_eq!(MaxFeatures::Log2.resolve(8), 3);
        assert_eq!(MaxFeatures::All.resolve(7), 7);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(7), 3);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::Fraction(0.01).resolve(4), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnKind::Categorical.to_string(), "categorical");
        assert_eq!(ArtifactKind::Model.to_string(), "model");
    }
}
