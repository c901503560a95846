//! Front-end boundary of the party prediction pipeline.
//!
//! [`ElectionPipeline`] bundles the configuration and the artifact store and
//! exposes the operations a front-end drives. An in-process reader/writer
//! lock keeps `train`, `replace_dataset` and `clean_raw_dataset` exclusive
//! with in-flight predictions and reads.

use crate::config::PipelineConfig;
use crate::core::constants::{LABEL_COLUMN, REQUIRED_COLUMNS, STATE_COLUMN};
use crate::core::error::{PredictionError, Result};
use crate::dataset::{
    validate_required_columns, CleaningReport, CsvLoader, DatasetCleaner,
    DatasetSummary, SummaryOptions, Table,
};
use crate::io::{write_file_atomic, ArtifactStore};
use crate::prediction::{Predictor, Query};
use crate::training::{ClassifierTrainer, TrainingReport};
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Train, predict and manage the dataset behind one handle.
#[derive(Debug)]
pub struct ElectionPipeline {
    config: PipelineConfig,
    store: ArtifactStore,
    lock: RwLock<()>,
}

impl ElectionPipeline {
    /// Create a pipeline over the configured dataset and artifact directory
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let store = ArtifactStore::new(&config.artifact_dir);
        Ok(ElectionPipeline {
            config,
            store,
            lock: RwLock::new(()),
        })
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Artifact store holding codecs and model
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    // Guards no data, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn loader(&self) -> CsvLoader {
        CsvLoader::new(self.config.csv.clone())
    }

    fn load_dataset(&self) -> Result<Table> {
        self.loader().load_table(&self.config.dataset_path)
    }

    /// Retrain on the current dataset and replace the persisted artifacts.
    pub fn train(&self) -> Result<TrainingReport> {
        let _guard = self.write();
        log::info!("Training on {}", self.config.dataset_path.display());
        ClassifierTrainer::new(self.config.clone(), self.store.clone()).train()
    }

    /// Predict the winning party for a state, year, turnout and margin.
    pub fn predict(
        &self,
        state: &str,
        year: i32,
        turnout: f64,
        margin: f64,
    ) -> std::result::Result<String, PredictionError> {
        self.predict_query(&Query::new(state, year, turnout, margin))
    }

    /// Predict the winning party for a query.
    pub fn predict_query(&self, query: &Query) -> std::result::Result<String, PredictionError> {
        let _guard = self.read();
        Predictor::from_config(&self.config).predict(query)
    }

    /// Probability of every party for a query, most likely first.
    pub fn predict_proba(
        &self,
        query: &Query,
    ) -> std::result::Result<Vec<(String, f64)>, PredictionError> {
        let _guard = self.read();
        Predictor::from_config(&self.config).predict_proba(query)
    }

    /// Sorted distinct states of the current dataset.
    pub fn list_known_states(&self) -> Result<Vec<String>> {
        let _guard = self.read();
        let table = self.load_dataset()?;
        let column = table.require_column(&self.config.state_column)?;

        let states: BTreeSet<&str> = column
            .values()
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .collect();
        Ok(states.into_iter().map(str::to_string).collect())
    }

    /// Validate `bytes` as a cleaned dataset and atomically replace the current one.
    ///
    /// The bytes must parse as a headered CSV with at least one row and every
    /// required column. Existing artifacts are left alone; retrain to refresh them.
    pub fn replace_dataset(&self, bytes: &[u8]) -> Result<()> {
        let table = self.loader().parse_bytes(bytes)?;
        let required: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .map(|&column| match column {
                STATE_COLUMN => self.config.state_column.as_str(),
                LABEL_COLUMN => self.config.label_column.as_str(),
                other => other,
            })
            .collect();
        validate_required_columns(&table, &required)?;

        let _guard = self.write();
        write_file_atomic(&self.config.dataset_path, bytes)?;
        log::info!(
            "Replaced dataset {} ({} rows, {} columns)",
            self.config.dataset_path.display(),
            table.num_rows(),
            table.num_columns()
        );
        Ok(())
    }

    /// Descriptive statistics of the current dataset.
    pub fn summary(&self) -> Result<DatasetSummary> {
        self.summary_with(&SummaryOptions::default())
    }

    /// Descriptive statistics with custom list and histogram sizes.
    pub fn summary_with(&self, options: &SummaryOptions) -> Result<DatasetSummary> {
        let _guard = self.read();
        DatasetSummary::compute_with(&self.load_dataset()?, options)
    }

    /// Clean the configured raw dataset into the cleaned dataset path.
    pub fn clean_raw_dataset(&self) -> Result<CleaningReport> {
        let _guard = self.write();
        DatasetCleaner::new(self.config.cleaning.clone(), self.loader())
            .clean_file(&self.config.raw_dataset_path, &self.config.dataset_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::core::error::PipelineError;
    use tempfile::TempDir;

    fn pipeline(dir: &TempDir) -> ElectionPipeline {
        let config = ConfigBuilder::new()
            .dataset_path(dir.path().join("cleaned.csv"))
            .raw_dataset_path(dir.path().join("raw.csv"))
            .artifact_dir(dir.path().join("artifacts"))
            .num_trees(5)
            .build()
            .unwrap();
        ElectionPipeline::new(config).unwrap()
    }

    #[test]
    fn test_replace_dataset_and_list_states() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir);
        pipeline
            .replace_dataset(b"state,year,Turnout,margin,party\nKerala,1977,60,10,INC\nGoa,1980,55,3,BJP\nKerala,1984,61,4,CPM\n")
            .unwrap();
        assert_eq!(pipeline.list_known_states().unwrap(), vec!["Goa", "Kerala"]);
    }

    #[test]
    fn test_replace_dataset_rejects_missing_columns() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir);
        pipeline
            .replace_dataset(b"state,year,Turnout,margin,party\nGoa,1980,55,3,BJP\n")
            .unwrap();

        let err = pipeline
            .replace_dataset(b"state,year,party\nGoa,1980,BJP\n")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Dataset { .. }));
        assert!(err.to_string().contains("Turnout"));

        // previous dataset still in place
        assert_eq!(pipeline.list_known_states().unwrap(), vec!["Goa"]);
    }

    #[test]
    fn test_replace_dataset_rejects_empty_body() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir);
        assert!(pipeline
            .replace_dataset(b"state,year,Turnout,margin,party\n")
            .is_err());
        assert!(!dir.path().join("cleaned.csv").exists());
    }

    #[test]
    fn test_predict_without_artifacts() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir);
        let err = pipeline.predict("Goa", 2019, 60.0, 10.0).unwrap_err();
        assert!(err.is_artifact_load());
    }

    #[test]
    fn test_clean_raw_dataset() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("raw.csv"),
            " state ,year,Turnout,margin,party\nGoa,1980,55.5%,\"1,200\",BJP\n",
        )
        .unwrap();

        let pipeline = pipeline(&dir);
        let report = pipeline.clean_raw_dataset().unwrap();
        assert_eq!(report.num_rows, 1);
        assert_eq!(pipeline.list_known_states().unwrap(), vec!["Goa"]);
        let summary = pipeline.summary().unwrap();
        assert_eq!(summary.num_rows, 1);
    }
}
