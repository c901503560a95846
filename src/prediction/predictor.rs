//! Party prediction from persisted artifacts.
//!
//! The predictor holds no model state of its own: every call loads the
//! codecs and the model from the [`ArtifactStore`], checks the model's
//! training schema against the current dataset header and the codecs' run
//! ids against the model's, assembles one row and decodes the winning class.

use crate::config::PipelineConfig;
use crate::core::constants::{MODEL_ARTIFACT, NUMERIC_QUERY_COLUMNS};
use crate::core::error::{PipelineError, PredictionError, Result};
use crate::dataset::{CategoricalCodec, CsvConfig, CsvLoader, TrainingSchema};
use crate::io::ArtifactStore;
use crate::prediction::assembler::FeatureAssembler;
use crate::prediction::query::Query;
use crate::training::FittedModel;
use std::path::{Path, PathBuf};

/// Model and codecs loaded for one prediction.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    model: FittedModel,
    label_codec: CategoricalCodec,
    state_codec: CategoricalCodec,
}

impl LoadedModel {
    /// The fitted model
    pub fn model(&self) -> &FittedModel {
        &self.model
    }

    /// Codec of the label column
    pub fn label_codec(&self) -> &CategoricalCodec {
        &self.label_codec
    }

    /// Codec of the state column
    pub fn state_codec(&self) -> &CategoricalCodec {
        &self.state_codec
    }

    /// Predict the party for one query.
    pub fn predict(&self, query: &Query) -> Result<String> {
        let row = FeatureAssembler::new(self.model.schema(), &self.state_codec).assemble(query)?;
        let code = self.model.predict(&row.view())?;
        let label = self.label_codec.decode(code).map_err(|e| {
            log::error!("Model produced class {} outside the label codec: {}", code, e);
            e
        })?;
        Ok(label.to_string())
    }

    /// Probability of every party for one query, most likely first.
    pub fn predict_proba(&self, query: &Query) -> Result<Vec<(String, f64)>> {
        let row = FeatureAssembler::new(self.model.schema(), &self.state_codec).assemble(query)?;
        let proba = self.model.predict_proba(&row.view())?;

        let mut ranked = proba
            .iter()
            .enumerate()
            .map(|(code, &p)| Ok((self.label_codec.decode(code)?.to_string(), p)))
            .collect::<Result<Vec<_>>>()?;
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }
}

/// Predicts the winning party from persisted artifacts.
#[derive(Debug, Clone)]
pub struct Predictor {
    store: ArtifactStore,
    dataset_path: PathBuf,
    loader: CsvLoader,
    state_column: String,
}

impl Predictor {
    /// Create a predictor reading artifacts from `store` and the header of `dataset_path`
    pub fn new<P: Into<PathBuf>, S: Into<String>>(
        store: ArtifactStore,
        dataset_path: P,
        csv_config: CsvConfig,
        state_column: S,
    ) -> Self {
        Predictor {
            store,
            dataset_path: dataset_path.into(),
            loader: CsvLoader::new(csv_config),
            state_column: state_column.into(),
        }
    }

    /// Create a predictor from the pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Predictor::new(
            ArtifactStore::new(&config.artifact_dir),
            &config.dataset_path,
            config.csv.clone(),
            &config.state_column,
        )
    }

    /// Dataset whose header the model schema is checked against
    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    /// Load the model and its codecs, and check the model against the dataset header.
    pub fn load(&self) -> Result<LoadedModel> {
        let model: FittedModel = self.store.load(MODEL_ARTIFACT)?;

        let header = self.loader.read_header(&self.dataset_path)?;
        let current = TrainingSchema::from_header(&header, model.label_column())?;
        model.schema().ensure_matches(&current)?;

        if let Some(column) = NUMERIC_QUERY_COLUMNS
            .iter()
            .find(|column| model.feature_codec(column).is_some())
        {
            return Err(PipelineError::schema_mismatch(format!(
                "model encoded numeric column '{}' as categorical; clean the dataset and retrain",
                column
            )));
        }

        let label_codec: CategoricalCodec = self.store.load(model.label_codec())?;
        model.ensure_same_run(model.label_codec(), &label_codec)?;
        if label_codec.len() != model.num_classes() {
            return Err(PipelineError::artifact_load(
                model.label_codec(),
                format!(
                    "codec has {} classes but the model was fitted on {}",
                    label_codec.len(),
                    model.num_classes()
                ),
            ));
        }

        let state_artifact = model.feature_codec(&self.state_column).ok_or_else(|| {
            PipelineError::schema_mismatch(format!(
                "model has no codec for state column '{}'",
                self.state_column
            ))
        })?;
        let state_codec: CategoricalCodec = self.store.load(state_artifact)?;
        model.ensure_same_run(state_artifact, &state_codec)?;

        Ok(LoadedModel {
            model,
            label_codec,
            state_codec,
        })
    }

    /// Predict the winning party for `query`.
    pub fn predict(&self, query: &Query) -> std::result::Result<String, PredictionError> {
        let result = self.load().and_then(|loaded| loaded.predict(query));
        match result {
            Ok(party) => {
                log::info!(
                    "Predicted '{}' for state '{}', year {}",
                    party,
                    query.state,
                    query.year
                );
                Ok(party)
            }
            Err(err) => {
                log::warn!("Prediction failed ({}): {}", err.category(), err);
                Err(PredictionError::new(err))
            }
        }
    }

    /// Probability of every party for `query`, most likely first.
    pub fn predict_proba(
        &self,
        query: &Query,
    ) -> std::result::Result<Vec<(String, f64)>, PredictionError> {
        self.load()
            .and_then(|loaded| loaded.predict_proba(query))
            .map_err(PredictionError::new)
    }
}
