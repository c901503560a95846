//! In-memory table of named string columns.
//!
//! Cells are kept as read from the CSV file; numeric coercion and category
//! encoding happen later, per column.

use crate::core::constants::NULL_TOKENS;
use crate::core::error::{PipelineError, Result};
use crate::core::types::{ColumnKind, FeatureValue};
use std::collections::HashSet;

/// Returns true when `cell` is one of the recognised null tokens.
pub fn is_null_token(cell: &str) -> bool {
    let cell = cell.trim();
    NULL_TOKENS.iter().any(|token| *token == cell)
}

/// Parse a cell as a number, returning `None` for null tokens and unparsable text.
pub fn parse_numeric(cell: &str) -> Option<FeatureValue> {
    if is_null_token(cell) {
        return None;
    }
    cell.trim().parse::<FeatureValue>().ok().filter(|v| !v.is_nan())
}

/// A single named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<String>,
}

impl Column {
    /// Create a new column
    pub fn new<S: Into<String>>(name: S, values: Vec<String>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw cell values
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the column has no cells
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Infer the column kind: numeric when every non-null cell parses as a number.
    pub fn kind(&self) -> ColumnKind {
        let numeric = self
            .values
            .iter()
            .filter(|cell| !is_null_token(cell))
            .all(|cell| cell.trim().parse::<FeatureValue>().is_ok());

        if numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    /// Coerce every cell to a number; null tokens become NaN.
    pub fn numeric_values(&self) -> Result<Vec<FeatureValue>> {
        self.values
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                if is_null_token(cell) {
                    return Ok(FeatureValue::NAN);
                }
                cell.trim().parse::<FeatureValue>().map_err(|_| {
                    crate::dataset_error!(
                        "column '{}' row {}: '{}' is not numeric",
                        self.name, row, cell
                    )
                })
            })
            .collect()
    }

    /// Non-null numeric values, skipping nulls and unparsable cells.
    pub fn present_numeric_values(&self) -> Vec<FeatureValue> {
        self.values.iter().filter_map(|cell| parse_numeric(cell)).collect()
    }

    /// Cell values as categories, failing on the first null cell.
    pub fn category_values(&self) -> Result<Vec<&str>> {
        self.values
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                let cell = cell.trim();
                if cell.is_empty() {
                    Err(crate::dataset_error!(
                        "column '{}' row {}: categorical value is missing",
                        self.name, row
                    ))
                } else {
                    Ok(cell)
                }
            })
            .collect()
    }

    /// Number of null cells
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|cell| is_null_token(cell)).count()
    }
}

/// Rectangular table of named string columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Build a table from a header and row-major records.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let num_columns = headers.len();
        let mut column_values: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); num_columns];

        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != num_columns {
                return Err(PipelineError::data_loading(format!(
                    "row {} has {} fields, header has {}",
                    row_index,
                    row.len(),
                    num_columns
                )));
            }
            for (values, cell) in column_values.iter_mut().zip(row) {
                values.push(cell);
            }
        }

        let columns = headers
            .into_iter()
            .zip(column_values)
            .map(|(name, values)| Column::new(name, values))
            .collect();

        Self::from_columns(columns)
    }

    /// Build a table from columns of equal length with unique names.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(PipelineError::data_loading("table has no columns"));
        }

        let num_rows = columns[0].len();
        let mut seen = HashSet::new();
        for column in &columns {
            if column.name().trim().is_empty() {
                return Err(PipelineError::data_loading("table has an unnamed column"));
            }
            if !seen.insert(column.name()) {
                return Err(PipelineError::data_loading(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
            if column.len() != num_rows {
                return Err(PipelineError::data_loading(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    num_rows
                )));
            }
        }

        Ok(Table { columns, num_rows })
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Columns in file order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in file order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    /// Look up a column by name, failing when absent
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| {
            crate::dataset_error!(
                "dataset has no column '{}' (columns: {})",
                name,
                self.column_names().join(", ")
            )
        })
    }

    /// True when a column with this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Replace a column's values, keeping its position.
    pub fn replace_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.num_rows {
            return Err(crate::dataset_error!(
                "replacement for column '{}' has {} rows, expected {}",
                name,
                values.len(),
                self.num_rows
            ));
        }
        let column = self
            .columns
            .iter_mut()
            .find(|column| column.name() == name)
            .ok_or_else(|| crate::dataset_error!("dataset has no column '{}'", name))?;
        column.values = values;
        Ok(())
    }

    /// Row `index` as cell references in column order
    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        if index >= self.num_rows {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[index].as_str()).collect())
    }
}
