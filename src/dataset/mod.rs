//! Dataset management module for the party prediction pipeline.
//!
//! This module provides loading, cleaning, encoding and partitioning of the
//! historical election results, plus the descriptive summary used for charts.

pub mod cleaning;
pub mod codec;
pub mod dataset;
pub mod encoding;
pub mod loader;
pub mod partition;
pub mod schema;
pub mod summary;
pub mod table;

// Re-export commonly used types
pub use cleaning::{CleaningConfig, CleaningReport, DatasetCleaner};
pub use codec::CategoricalCodec;
pub use dataset::Dataset;
pub use encoding::{codec_artifact_name, FittedEncoders, TableEncoder};
pub use loader::{CsvConfig, CsvLoader};
pub use partition::{train_test_split, Partition};
pub use schema::TrainingSchema;
pub use summary::{DatasetSummary, SummaryOptions};
pub use table::{Column, Table};

use crate::core::error::{PipelineError, Result};

/// Fail unless `table` has every column in `required` and at least one row.
pub fn validate_required_columns(table: &Table, required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !table.has_column(name))
        .collect();

    if !missing.is_empty() {
        return Err(crate::dataset_error!(
            "dataset is missing required columns: {}",
            missing.join(", ")
        ));
    }

    if table.num_rows() == 0 {
        return Err(PipelineError::dataset("dataset has no rows"));
    }

    Ok(())
}
