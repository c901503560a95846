//! Table encoding.
//!
//! Fits one independent [`CategoricalCodec`] per categorical column (the
//! label included) and turns a cleaned [`Table`] into a numeric [`Dataset`].

use crate::core::constants::{CODEC_ARTIFACT_SUFFIX, NUMERIC_QUERY_COLUMNS};
use crate::core::error::Result;
use crate::core::types::{ColumnKind, FeatureValue};
use crate::dataset::codec::CategoricalCodec;
use crate::dataset::dataset::Dataset;
use crate::dataset::schema::TrainingSchema;
use crate::dataset::table::Table;
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Artifact name under which the codec of `column` is persisted.
///
/// Characters other than ASCII alphanumerics and `_` become `_`.
pub fn codec_artifact_name(column: &str) -> String {
    let sanitized: String = column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("{}{}", sanitized, CODEC_ARTIFACT_SUFFIX)
}

/// Codecs fitted during one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedEncoders {
    label: CategoricalCodec,
    features: BTreeMap<String, CategoricalCodec>,
}

impl FittedEncoders {
    /// Codec of the label column
    pub fn label(&self) -> &CategoricalCodec {
        &self.label
    }

    /// Codec of a categorical feature column
    pub fn feature(&self, column: &str) -> Option<&CategoricalCodec> {
        self.features.get(column)
    }

    /// Codecs of every categorical feature column, keyed by column name
    pub fn features(&self) -> &BTreeMap<String, CategoricalCodec> {
        &self.features
    }

    /// Tag every codec with the id of the training run that fitted it.
    pub fn with_run_id(self, run_id: u64) -> Self {
        FittedEncoders {
            label: self.label.with_run_id(run_id),
            features: self
                .features
                .into_iter()
                .map(|(column, codec)| (column, codec.with_run_id(run_id)))
                .collect(),
        }
    }

    /// Every codec with its artifact name, label first
    pub fn artifacts(&self) -> Vec<(String, &CategoricalCodec)> {
        let mut artifacts = vec![(codec_artifact_name(self.label.column()), &self.label)];
        artifacts.extend(
            self.features
                .iter()
                .map(|(column, codec)| (codec_artifact_name(column), codec)),
        );
        artifacts
    }
}

/// Encodes a cleaned table into a training dataset.
#[derive(Debug, Clone)]
pub struct TableEncoder {
    label_column: String,
    state_column: String,
}

impl TableEncoder {
    /// Create an encoder for the given label and state columns
    pub fn new<L: Into<String>, S: Into<String>>(label_column: L, state_column: S) -> Self {
        TableEncoder {
            label_column: label_column.into(),
            state_column: state_column.into(),
        }
    }

    /// Kind of a column as the encoder will treat it.
    ///
    /// The label and state columns are always categorical. Year, turnout and
    /// margin are always numeric since queries supply them as raw numbers.
    pub fn column_kind(&self, table: &Table, column: &str) -> Result<ColumnKind> {
        if column == self.label_column || column == self.state_column {
            return Ok(ColumnKind::Categorical);
        }
        if NUMERIC_QUERY_COLUMNS.contains(&column) {
            return Ok(ColumnKind::Numeric);
        }
        Ok(table.require_column(column)?.kind())
    }

    /// Fit codecs on `table` and encode it.
    pub fn fit_transform(&self, table: &Table) -> Result<(Dataset, FittedEncoders)> {
        let label_column = table.require_column(&self.label_column)?;
        table.require_column(&self.state_column)?;

        let label_values = label_column.category_values()?;
        let label = CategoricalCodec::fit(&self.label_column, &label_values);
        let labels: Array1<usize> = label.encode_all(&label_values)?.into();

        let schema = TrainingSchema::from_header(&table.column_names(), &self.label_column)?;
        let num_rows = table.num_rows();
        let num_features = schema.len();

        let mut features = Array2::<FeatureValue>::zeros((num_rows, num_features));
        let mut feature_codecs = BTreeMap::new();
        let mut artifact_names = BTreeMap::new();
        artifact_names.insert(codec_artifact_name(&self.label_column), self.label_column.clone());

        for (position, name) in schema.columns().iter().enumerate() {
            let column = table.require_column(name)?;
            let values: Vec<FeatureValue> = match self.column_kind(table, name)? {
                ColumnKind::Numeric => column.numeric_values()?,
                ColumnKind::Categorical => {
                    let cells = column.category_values()?;
                    let codec = CategoricalCodec::fit(name, &cells);
                    let codes = codec.encode_all(&cells)?;

                    let artifact = codec_artifact_name(name);
                    if let Some(previous) = artifact_names.insert(artifact.clone(), name.clone()) {
                        return Err(crate::dataset_error!(
                            "columns '{}' and '{}' both map to artifact '{}'",
                            previous,
                            name,
                            artifact
                        ));
                    }

                    log::debug!("Fitted codec for '{}' with {} categories", name, codec.len());
                    feature_codecs.insert(name.clone(), codec);
                    codes.into_iter().map(|code| code as FeatureValue).collect()
                }
            };

            features.column_mut(position).assign(&Array1::from(values));
        }

        log::info!(
            "Encoded {} rows: {} features ({} categorical), {} classes",
            num_rows,
            num_features,
            feature_codecs.len(),
            label.len()
        );

        let dataset = Dataset::new(
            features,
            labels,
            schema.columns().to_vec(),
            label.len(),
        )?;

        Ok((
            dataset,
            FittedEncoders {
                label,
                features: feature_codecs,
            },
        ))
    }
}
