//! Fitted model artifact.

use crate::core::error::{PipelineError, Result};
use crate::core::types::{ArtifactKind, ClassIndex, FeatureValue};
use crate::dataset::{CategoricalCodec, TrainingSchema};
use crate::ensemble::RandomForestClassifier;
use crate::io::Artifact;
use chrono::{DateTime, Utc};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A trained forest together with everything needed to feed it.
///
/// Records the training schema, the label column and the artifact names of
/// the codecs used for the label and every categorical feature. The run id
/// matches the one stamped into those codecs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    forest: RandomForestClassifier,
    schema: TrainingSchema,
    label_column: String,
    label_codec: String,
    feature_codecs: BTreeMap<String, String>,
    run_id: u64,
    trained_at: DateTime<Utc>,
}

impl Artifact for FittedModel {
    const KIND: ArtifactKind = ArtifactKind::Model;
}

impl FittedModel {
    /// Bundle a fitted forest with its schema and codec names.
    pub fn new(
        forest: RandomForestClassifier,
        schema: TrainingSchema,
        label_column: String,
        label_codec: String,
        feature_codecs: BTreeMap<String, String>,
        run_id: u64,
    ) -> Result<Self> {
        if forest.num_features() != schema.len() {
            return Err(PipelineError::schema_mismatch(format!(
                "forest expects {} features, schema lists {}",
                forest.num_features(),
                schema.len()
            )));
        }
        if let Some(column) = feature_codecs.keys().find(|c| !schema.contains(c)) {
            return Err(PipelineError::schema_mismatch(format!(
                "codec recorded for column '{}' which is not in the schema",
                column
            )));
        }

        Ok(FittedModel {
            forest,
            schema,
            label_column,
            label_codec,
            feature_codecs,
            run_id,
            trained_at: Utc::now(),
        })
    }

    /// The underlying forest
    pub fn forest(&self) -> &RandomForestClassifier {
        &self.forest
    }

    /// Ordered feature columns the forest was fitted on
    pub fn schema(&self) -> &TrainingSchema {
        &self.schema
    }

    /// Number of classes of the label codec
    pub fn num_classes(&self) -> usize {
        self.forest.num_classes()
    }

    /// Label column name
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Artifact name of the label codec
    pub fn label_codec(&self) -> &str {
        &self.label_codec
    }

    /// Artifact name of the codec for a categorical feature column
    pub fn feature_codec(&self, column: &str) -> Option<&str> {
        self.feature_codecs.get(column).map(String::as_str)
    }

    /// Categorical feature columns with their codec artifact names
    pub fn feature_codecs(&self) -> &BTreeMap<String, String> {
        &self.feature_codecs
    }

    /// Training run that produced the model and its codecs
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Fail unless `codec` was fitted in the same training run as the model.
    pub fn ensure_same_run(&self, artifact: &str, codec: &CategoricalCodec) -> Result<()> {
        if codec.run_id() != self.run_id {
            return Err(PipelineError::artifact_load(
                artifact,
                format!(
                    "codec comes from training run {:016x}, the model from run {:016x}",
                    codec.run_id(),
                    self.run_id
                ),
            ));
        }
        Ok(())
    }

    /// When the model was fitted
    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Class probabilities for one schema-ordered row
    pub fn predict_proba(&self, row: &ArrayView1<'_, FeatureValue>) -> Result<Array1<f64>> {
        self.forest.predict_proba(row)
    }

    /// Predicted class code for one schema-ordered row
    pub fn predict(&self, row: &ArrayView1<'_, FeatureValue>) -> Result<ClassIndex> {
        self.forest.predict(row)
    }
}
