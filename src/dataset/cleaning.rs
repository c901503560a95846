//! Raw dataset cleaning.
//!
//! Turns the raw election export into the cleaned CSV the rest of the
//! pipeline reads: thousands separators and percent signs are stripped,
//! numeric columns are coerced (invalid cells become empty), and the year is
//! forced to an integer with invalid or missing values set to `0`.

use crate::core::constants::{TURNOUT_COLUMN, YEAR_COLUMN};
use crate::core::error::Result;
use crate::dataset::loader::CsvLoader;
use crate::dataset::table::{parse_numeric, Table};
use crate::io::write_file_atomic;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Columns touched by each cleaning rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Columns whose values carry `,` thousands separators
    pub thousands_columns: Vec<String>,
    /// Columns whose values carry a trailing `%`
    pub percent_columns: Vec<String>,
    /// Column coerced to an integer year
    pub year_column: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        CleaningConfig {
            thousands_columns: vec![
                "electors".to_string(),
                "votes".to_string(),
                "margin".to_string(),
            ],
            percent_columns: vec![TURNOUT_COLUMN.to_string(), "margin%".to_string()],
            year_column: YEAR_COLUMN.to_string(),
        }
    }
}

/// Outcome of one cleaning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Rows written
    pub num_rows: usize,
    /// Null cells per column after cleaning, in column order
    pub null_counts: Vec<(String, usize)>,
    /// Configured columns absent from the raw file
    pub skipped_columns: Vec<String>,
}

/// Cleans raw election exports.
#[derive(Debug, Clone, Default)]
pub struct DatasetCleaner {
    config: CleaningConfig,
    loader: CsvLoader,
}

impl DatasetCleaner {
    /// Create a cleaner
    pub fn new(config: CleaningConfig, loader: CsvLoader) -> Self {
        DatasetCleaner { config, loader }
    }

    /// Clean `input` and atomically write the result to `output`.
    pub fn clean_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<CleaningReport> {
        let input = input.as_ref();
        let output = output.as_ref();
        let table = self.loader.load_table(input)?;
        let (cleaned, report) = self.clean_table(table)?;
        let bytes = self.loader.to_csv_bytes(&cleaned)?;
        write_file_atomic(output, &bytes)?;

        log::info!(
            "Cleaned dataset saved to {} ({} rows)",
            output.display(),
            report.num_rows
        );
        Ok(report)
    }

    /// Apply every cleaning rule to an in-memory table.
    pub fn clean_table(&self, mut table: Table) -> Result<(Table, CleaningReport)> {
        let mut skipped_columns = Vec::new();

        for name in &self.config.thousands_columns {
            if !self.rewrite(&mut table, name, |cell| coerce_numeric(&cell.replace(',', "")))? {
                skipped_columns.push(name.clone());
            }
        }

        for name in &self.config.percent_columns {
            if !self.rewrite(&mut table, name, |cell| coerce_numeric(&cell.replace('%', "")))? {
                skipped_columns.push(name.clone());
            }
        }

        if !self.rewrite(&mut table, &self.config.year_column, coerce_year)? {
            skipped_columns.push(self.config.year_column.clone());
        }

        let null_counts: Vec<(String, usize)> = table
            .columns()
            .iter()
            .map(|column| (column.name().to_string(), column.null_count()))
            .collect();
        for (name, count) in null_counts.iter().filter(|(_, count)| *count > 0) {
            log::info!("Column '{}' has {} null values", name, count);
        }

        let report = CleaningReport {
            num_rows: table.num_rows(),
            null_counts,
            skipped_columns,
        };
        Ok((table, report))
    }

    /// Rewrite every cell of `name`; returns false when the column is absent.
    fn rewrite<F>(&self, table: &mut Table, name: &str, clean: F) -> Result<bool>
    where
        F: Fn(&str) -> String,
    {
        let values = match table.column(name) {
            Some(column) => column.values().iter().map(|cell| clean(cell)).collect(),
            None => {
                log::warn!("Column '{}' not found in raw dataset, skipping", name);
                return Ok(false);
            }
        };
        table.replace_column(name, values)?;
        Ok(true)
    }
}

/// Parse a cell as a number, rendering invalid cells as empty.
fn coerce_numeric(cell: &str) -> String {
    parse_numeric(cell.trim())
        .map(|value| value.to_string())
        .unwrap_or_default()
}

/// Parse a cell as an integer year, rendering invalid cells as `0`.
fn coerce_year(cell: &str) -> String {
    parse_numeric(cell)
        .filter(|value| value.is_finite())
        .map(|value| (value.trunc() as i64).to_string())
        .unwrap_or_else(|| "0".to_string())
}
