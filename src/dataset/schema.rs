//! Training schema: the ordered feature columns a model was fitted on.

use crate::core::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered list of feature column names used to fit the classifier.
///
/// Inference rows are reordered and padded to match this order exactly.
/// Column names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TrainingSchema {
    columns: Vec<String>,
}

impl TrainingSchema {
    /// Create a schema from ordered column names.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(PipelineError::schema_mismatch("training schema has no columns"));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(PipelineError::schema_mismatch(format!(
                    "training schema lists column '{}' more than once",
                    column
                )));
            }
        }

        Ok(TrainingSchema { columns })
    }

    /// Derive the schema from a dataset header by dropping the label column.
    pub fn from_header<S: AsRef<str>>(header: &[S], label_column: &str) -> Result<Self> {
        if !header.iter().any(|h| h.as_ref() == label_column) {
            return Err(PipelineError::schema_mismatch(format!(
                "dataset header has no label column '{}'",
                label_column
            )));
        }

        Self::new(
            header
                .iter()
                .map(|h| h.as_ref())
                .filter(|h| *h != label_column)
                .map(str::to_string)
                .collect(),
        )
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a constructed schema
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// True when the schema has this column
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Fail with a schema mismatch describing how `current` differs from this schema.
    pub fn ensure_matches(&self, current: &TrainingSchema) -> Result<()> {
        if self == current {
            return Ok(());
        }

        let missing: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| !current.contains(c))
            .map(String::as_str)
            .collect();
        let added: Vec<&str> = current
            .columns
            .iter()
            .filter(|c| !self.contains(c))
            .map(String::as_str)
            .collect();

        let message = if missing.is_empty() && added.is_empty() {
            format!(
                "columns are reordered: model expects [{}], dataset has [{}]",
                self.columns.join(", "),
                current.columns.join(", ")
            )
        } else {
            format!(
                "dataset is missing [{}] and adds [{}] relative to the trained model",
                missing.join(", "),
                added.join(", ")
            )
        };

        Err(PipelineError::schema_mismatch(message))
    }
}

impl TryFrom<Vec<String>> for TrainingSchema {
    type Error = PipelineError;

    fn try_from(columns: Vec<String>) -> Result<Self> {
        TrainingSchema::new(columns)
    }
}

impl From<TrainingSchema> for Vec<String> {
    fn from(schema: TrainingSchema) -> Self {
        schema.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(columns: &[&str]) -> TrainingSchema {
        TrainingSchema::new(columns.iter().map(|c| c.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_from_header_drops_label_and_keeps_order() {
        let header = ["state", "year", "party", "Turnout", "margin"];
        let schema = TrainingSchema::from_header(&header, "party").unwrap();
        assert_eq!(schema.columns(), &["state", "year", "Turnout", "margin"]);
        assert_eq!(schema.position("Turnout"), Some(2));
    }

    #[test]
    fn test_from_header_requires_label() {
        let result = TrainingSchema::from_header(&["state", "year"], "party");
        assert!(matches!(result, Err(PipelineError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_duplicates_rejected() {
        let result = TrainingSchema::new(vec!["a".to_string(), "a".to_string()]);
        assert!(matches!(result, Err(PipelineError::SchemaMismatch { .. })));

        let json = r#"["a","b","a"]"#;
        assert!(serde_json::from_str::<TrainingSchema>(json).is_err());
    }

    #[test]
    fn test_ensure_matches() {
        let trained = schema(&["state", "year", "Turnout"]);
        assert!(trained.ensure_matches(&schema(&["state", "year", "Turnout"])).is_ok());

        let err = trained
            .ensure_matches(&schema(&["state", "year", "electors"]))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Turnout"));
        assert!(message.contains("electors"));

        let err = trained
            .ensure_matches(&schema(&["year", "state", "Turnout"]))
            .unwrap_err();
        assert!(err.to_string().contains("reordered"));
    }
}
