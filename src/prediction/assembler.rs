//! Feature row assembly for inference.
//!
//! Builds a row whose columns and order match the [`TrainingSchema`] exactly,
//! whatever order the values are supplied in. Schema columns with no supplied
//! value receive the fill value.

use crate::core::constants::DEFAULT_FILL_VALUE;
use crate::core::error::{PipelineError, Result};
use crate::core::types::FeatureValue;
use crate::dataset::{CategoricalCodec, TrainingSchema};
use crate::prediction::query::Query;
use ndarray::Array1;

/// Turns queries into schema-ordered feature rows.
#[derive(Debug, Clone)]
pub struct FeatureAssembler<'a> {
    schema: &'a TrainingSchema,
    state_codec: &'a CategoricalCodec,
    fill_value: FeatureValue,
}

impl<'a> FeatureAssembler<'a> {
    /// Create an assembler; the state column is the one `state_codec` was fitted on.
    pub fn new(schema: &'a TrainingSchema, state_codec: &'a CategoricalCodec) -> Self {
        FeatureAssembler {
            schema,
            state_codec,
            fill_value: DEFAULT_FILL_VALUE,
        }
    }

    /// Use a different value for schema columns the query does not supply
    pub fn with_fill_value(mut self, fill_value: FeatureValue) -> Self {
        self.fill_value = fill_value;
        self
    }

    /// Encode the query's state and place every value into its schema slot.
    pub fn assemble(&self, query: &Query) -> Result<Array1<FeatureValue>> {
        let state = self.state_codec.encode(&query.state)? as FeatureValue;

        let mut values = Vec::with_capacity(4);
        values.push((self.state_codec.column(), state));
        values.extend(query.numeric_values());
        self.assemble_values(values)
    }

    /// Place already numeric values into their schema slots.
    ///
    /// Fails when a value names a column outside the schema or when the same
    /// column is supplied twice.
    pub fn assemble_values<I, S>(&self, values: I) -> Result<Array1<FeatureValue>>
    where
        I: IntoIterator<Item = (S, FeatureValue)>,
        S: AsRef<str>,
    {
        let mut row = Array1::from_elem(self.schema.len(), self.fill_value);
        let mut filled = vec![false; self.schema.len()];

        for (column, value) in values {
            let column = column.as_ref();
            let position = self.schema.position(column).ok_or_else(|| {
                PipelineError::schema_mismatch(format!(
                    "query column '{}' has no slot in the training schema [{}]",
                    column,
                    self.schema.columns().join(", ")
                ))
            })?;
            if filled[position] {
                return Err(PipelineError::schema_mismatch(format!(
                    "query column '{}' supplied more than once",
                    column
                )));
            }
            filled[position] = true;
            row[position] = value;
        }

        let defaulted = filled.iter().filter(|&&f| !f).count();
        if defaulted > 0 {
            log::debug!(
                "Filled {} schema column(s) with {}",
                defaulted,
                self.fill_value
            );
        }
        Ok(row)
    }
}
