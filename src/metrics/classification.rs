//! Classification metrics for model evaluation.
//!
//! This module provides accuracy, the confusion matrix, and a per-class
//! precision/recall/F1/support report with macro and weighted averages.
//! Ratios with a zero denominator are reported as `0.0`.

use crate::core::error::{PipelineError, Result};
use crate::core::types::ClassIndex;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

fn validate_inputs(
    targets: &ArrayView1<'_, ClassIndex>,
    predictions: &ArrayView1<'_, ClassIndex>,
) -> Result<()> {
    if targets.len() != predictions.len() {
        return Err(PipelineError::invalid_parameter(
            "predictions",
            predictions.len().to_string(),
            format!("length must match targets ({})", targets.len()),
        ));
    }
    if targets.is_empty() {
        return Err(PipelineError::invalid_parameter(
            "targets",
            "0",
            "at least one sample is required",
        ));
    }
    Ok(())
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Fraction of predictions equal to their target.
pub fn accuracy(
    targets: &ArrayView1<'_, ClassIndex>,
    predictions: &ArrayView1<'_, ClassIndex>,
) -> Result<f64> {
    validate_inputs(targets, predictions)?;
    let correct = targets
        .iter()
        .zip(predictions.iter())
        .filter(|(t, p)| t == p)
        .count();
    Ok(ratio(correct, targets.len()))
}

/// Confusion matrix with targets as rows and predictions as columns.
pub fn confusion_matrix(
    targets: &ArrayView1<'_, ClassIndex>,
    predictions: &ArrayView1<'_, ClassIndex>,
    num_classes: usize,
) -> Result<Array2<usize>> {
    validate_inputs(targets, predictions)?;
    let mut matrix = Array2::<usize>::zeros((num_classes, num_classes));
    for (&t, &p) in targets.iter().zip(predictions.iter()) {
        if t >= num_classes || p >= num_classes {
            return Err(PipelineError::out_of_range("class", t.max(p), num_classes));
        }
        matrix[[t, p]] += 1;
    }
    Ok(matrix)
}

/// Metrics for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Averaged metrics over the reported classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class report over every class present in targets or predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Per-class metrics, ascending by class code
    pub classes: Vec<ClassMetrics>,
    /// Overall accuracy
    pub accuracy: f64,
    /// Unweighted mean over classes
    pub macro_avg: AverageMetrics,
    /// Support-weighted mean over classes
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    /// Compute the report; `class_names[code]` names each class.
    pub fn compute(
        targets: &ArrayView1<'_, ClassIndex>,
        predictions: &ArrayView1<'_, ClassIndex>,
        class_names: &[String],
    ) -> Result<Self> {
        let num_classes = class_names.len();
        let matrix = confusion_matrix(targets, predictions, num_classes)?;

        let present: BTreeSet<ClassIndex> =
            targets.iter().chain(predictions.iter()).copied().collect();

        let classes: Vec<ClassMetrics> = present
            .into_iter()
            .map(|class| {
                let true_positive = matrix[[class, class]];
                let predicted = matrix.column(class).sum();
                let support = matrix.row(class).sum();
                let precision = ratio(true_positive, predicted);
                let recall = ratio(true_positive, support);
                let f1_score = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    name: class_names[class].clone(),
                    precision,
                    recall,
                    f1_score,
                    support,
                }
            })
            .collect();

        let total_support: usize = classes.iter().map(|c| c.support).sum();
        let count = classes.len().max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / count,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / count,
            f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / count,
            support: total_support,
        };

        let weight = |value: fn(&ClassMetrics) -> f64| -> f64 {
            if total_support == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|c| value(c) * c.support as f64)
                .sum::<f64>()
                / total_support as f64
        };
        let weighted_avg = AverageMetrics {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1_score: weight(|c| c.f1_score),
            support: total_support,
        };

        Ok(ClassificationReport {
            accuracy: accuracy(targets, predictions)?,
            classes,
            macro_avg,
            weighted_avg,
        })
    }

    /// Metrics for a class by name
    pub fn class(&self, name: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.name.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.name, c.precision, c.recall, c.f1_score, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (label, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, avg.precision, avg.recall, avg.f1_score, avg.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_accuracy() {
        let targets = array![0, 1, 2, 1];
        let predictions = array![0, 1, 1, 1];
        assert_relative_eq!(accuracy(&targets.view(), &predictions.view()).unwrap(), 0.75);
    }

    #[test]
    fn test_accuracy_rejects_mismatched_lengths() {
        let targets = array![0, 1];
        let predictions = array![0];
        assert!(accuracy(&targets.view(), &predictions.view()).is_err());
    }

    #[test]
    fn test_confusion_matrix() {
        let targets = array![0, 1, 2, 1];
        let predictions = array![0, 1, 1, 1];
        let matrix = confusion_matrix(&targets.view(), &predictions.view(), 3).unwrap();
        assert_eq!(matrix[[1, 1]], 2);
        assert_eq!(matrix[[2, 1]], 1);
        assert_eq!(matrix.sum(), 4);
        assert!(confusion_matrix(&targets.view(), &predictions.view(), 2).is_err());
    }

    #[test]
    fn test_report_values() {
        let targets = array![0, 0, 1, 1, 2];
        let predictions = array![0, 1, 1, 1, 1];
        let report = ClassificationReport::compute(
            &targets.view(),
            &predictions.view(),
            &names(&["INC", "BJP", "CPM"]),
        )
        .unwrap();

        assert_relative_eq!(report.accuracy, 0.6);

        let inc = report.class("INC").unwrap();
        assert_relative_eq!(inc.precision, 1.0);
        assert_relative_eq!(inc.recall, 0.5);
        assert_relative_eq!(inc.f1_score, 2.0 / 3.0);

        let bjp = report.class("BJP").unwrap();
        assert_relative_eq!(bjp.precision, 0.5);
        assert_relative_eq!(bjp.recall, 1.0);

        let cpm = report.class("CPM").unwrap();
        assert_eq!(cpm.precision, 0.0);
        assert_eq!(cpm.f1_score, 0.0);
        assert_eq!(cpm.support, 1);

        assert_relative_eq!(report.macro_avg.recall, 0.5);
        assert_relative_eq!(report.weighted_avg.recall, 0.6);
        assert_eq!(report.weighted_avg.support, 5);
    }

    #[test]
    fn test_report_skips_absent_classes() {
        let targets = array![0, 2];
        let predictions = array![0, 2];
        let report = ClassificationReport::compute(
            &targets.view(),
            &predictions.view(),
            &names(&["A", "B", "C"]),
        )
        .unwrap();
        assert_eq!(report.classes.len(), 2);
        assert!(report.class("B").is_none());
    }

    #[test]
    fn test_report_display() {
        let targets = array![0, 1];
        let predictions = array![0, 1];
        let report =
            ClassificationReport::compute(&targets.view(), &predictions.view(), &names(&["A", "B"]))
                .unwrap();
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("1.00"));
    }
}
