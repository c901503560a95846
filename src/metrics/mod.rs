//! Evaluation metrics for the party classifier.
//!
//! # Examples
//!
//! ```rust,no_run
//! use party_predictor::metrics::{accuracy, ClassificationReport};
//! use ndarray::array;
//!
//! # fn example() -> party_predictor::Result<()> {
//! let targets = array![0, 1, 1];
//! let predictions = array![0, 1, 0];
//! let names = vec!["INC".to_string(), "BJP".to_string()];
//!
//! println!("Accuracy: {:.4}", accuracy(&targets.view(), &predictions.view())?);
//! let report = ClassificationReport::compute(&targets.view(), &predictions.view(), &names)?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

pub mod classification;

pub use classification::{
    accuracy, confusion_matrix, AverageMetrics, ClassMetrics, ClassificationReport,
};
