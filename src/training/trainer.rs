//! Classifier training.
//!
//! Encodes the cleaned table, partitions it, fits the forest on the training
//! rows and evaluates it on the held-out rows. Codecs and model reach the
//! [`ArtifactStore`] only after every step succeeded.

use crate::config::PipelineConfig;
use crate::core::constants::MODEL_ARTIFACT;
use crate::core::error::Result;
use crate::dataset::{
    codec_artifact_name, train_test_split, CsvLoader, FittedEncoders, Table, TableEncoder,
    TrainingSchema,
};
use crate::ensemble::RandomForestClassifier;
use crate::io::ArtifactStore;
use crate::metrics::{accuracy, ClassificationReport};
use crate::training::model::FittedModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Held-out accuracy
    pub accuracy: f64,
    /// Per-class held-out metrics with decoded class names
    pub report: ClassificationReport,
    /// Rows used for fitting
    pub num_train: usize,
    /// Rows held out for evaluation
    pub num_test: usize,
    /// Feature columns in the training schema
    pub num_features: usize,
    /// Distinct label values
    pub num_classes: usize,
    /// Normalized importance per feature column, in schema order
    pub feature_importance: Vec<(String, f64)>,
    /// When the model was fitted
    pub trained_at: DateTime<Utc>,
}

impl TrainingReport {
    /// Render the report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model Accuracy: {:.4}", self.accuracy)?;
        writeln!(f, "Classification Report:")?;
        write!(f, "{}", self.report)
    }
}

/// Everything a training run produced, before persistence.
#[derive(Debug, Clone)]
pub struct TrainedPipeline {
    /// Fitted forest with its schema
    pub model: FittedModel,
    /// Codecs fitted on the full table
    pub encoders: FittedEncoders,
    /// Held-out evaluation
    pub report: TrainingReport,
}

/// Fits and persists the party classifier.
#[derive(Debug, Clone)]
pub struct ClassifierTrainer {
    config: PipelineConfig,
    store: ArtifactStore,
}

impl ClassifierTrainer {
    /// Create a trainer writing into `store`
    pub fn new(config: PipelineConfig, store: ArtifactStore) -> Self {
        ClassifierTrainer { config, store }
    }

    /// Configuration used for training
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the configured dataset, train, and persist the artifacts.
    pub fn train(&self) -> Result<TrainingReport> {
        let loader = CsvLoader::new(self.config.csv.clone());
        let table = loader.load_table(&self.config.dataset_path)?;
        self.train_table(&table)
    }

    /// Train on an already loaded table and persist the artifacts.
    pub fn train_table(&self, table: &Table) -> Result<TrainingReport> {
        let trained = self.fit(table)?;
        self.persist(&trained)?;
        Ok(trained.report)
    }

    /// Train on `table` without touching the artifact store.
    pub fn fit(&self, table: &Table) -> Result<TrainedPipeline> {
        self.config.validate()?;

        let encoder = TableEncoder::new(&self.config.label_column, &self.config.state_column);
        let (dataset, encoders) = encoder.fit_transform(table)?;
        let run_id: u64 = rand::random();
        let encoders = encoders.with_run_id(run_id);

        let num_classes = encoders.label().len();
        if num_classes < 2 {
            return Err(crate::training_error!(
                "label column '{}' has {} distinct value(s), at least 2 are required",
                self.config.label_column,
                num_classes
            ));
        }

        let partition = train_test_split(
            dataset.num_data(),
            self.config.test_fraction,
            self.config.random_seed,
        )?;
        let train = dataset.subset(&partition.train)?;
        let test = dataset.subset(&partition.test)?;
        log::info!(
            "Partitioned {} rows into {} training and {} held-out rows",
            dataset.num_data(),
            partition.num_train(),
            partition.num_test()
        );

        let forest = RandomForestClassifier::fit(&self.config.forest, self.config.random_seed, &train)?;

        let predictions = forest.predict_batch(test.features())?;
        let held_out_accuracy = accuracy(&test.labels(), &predictions.view())?;
        let report =
            ClassificationReport::compute(&test.labels(), &predictions.view(), encoders.label().classes())?;
        log::info!("Held-out accuracy: {:.4}", held_out_accuracy);

        let feature_importance = dataset
            .feature_names()
            .iter()
            .cloned()
            .zip(forest.feature_importance().iter().copied())
            .collect();

        let schema = TrainingSchema::new(dataset.feature_names().to_vec())?;
        let feature_codecs = encoders
            .features()
            .keys()
            .map(|column| (column.clone(), codec_artifact_name(column)))
            .collect();
        let model = FittedModel::new(
            forest,
            schema,
            self.config.label_column.clone(),
            codec_artifact_name(&self.config.label_column),
            feature_codecs,
            run_id,
        )?;
        log::debug!("Training run id {:016x}", run_id);

        let report = TrainingReport {
            accuracy: held_out_accuracy,
            report,
            num_train: partition.num_train(),
            num_test: partition.num_test(),
            num_features: dataset.num_features(),
            num_classes,
            feature_importance,
            trained_at: model.trained_at(),
        };

        Ok(TrainedPipeline {
            model,
            encoders,
            report,
        })
    }

    /// Stage every codec and the model, then commit them together.
    ///
    /// Renames happen one at a time with the model last; a reader racing the
    /// commit sees mismatched run ids and fails to load.
    pub fn persist(&self, trained: &TrainedPipeline) -> Result<()> {
        let mut staged = Vec::new();
        for (name, codec) in trained.encoders.artifacts() {
            staged.push(self.store.stage(&name, codec)?);
        }
        staged.push(self.store.stage(MODEL_ARTIFACT, &trained.model)?);

        let count = staged.len();
        self.store.commit(staged)?;
        log::info!(
            "Persisted {} artifacts to {}",
            count,
            self.store.dir().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::core::error::PipelineError;
    use crate::core::types::MaxFeatures;
    use tempfile::TempDir;

    fn table(rows: usize, parties: &[&str]) -> Table {
        let mut csv = String::from("state,year,Turnout,margin,party\n");
        for i in 0..rows {
            let party = parties[i % parties.len()];
            let turnout = if party == parties[0] { 40 + i % 5 } else { 70 + i % 5 };
            csv.push_str(&format!(
                "S{},{},{},{},{}\n",
                i % 3,
                1990 + i % 4,
                turnout,
                i * 10,
                party
            ));
        }
        CsvLoader::default().parse_bytes(csv.as_bytes()).unwrap()
    }

    fn trainer(dir: &TempDir) -> ClassifierTrainer {
        let config = ConfigBuilder::new()
            .artifact_dir(dir.path())
            .num_trees(10)
            .max_features(MaxFeatures::All)
            .build()
            .unwrap();
        ClassifierTrainer::new(config, ArtifactStore::new(dir.path()))
    }

    #[test]
    fn test_fit_reports_metrics() {
        let dir = TempDir::new().unwrap();
        let trained = trainer(&dir).fit(&table(40, &["INC", "BJP"])).unwrap();

        assert_eq!(trained.report.num_test, 8);
        assert_eq!(trained.report.num_train, 32);
        assert_eq!(trained.report.num_classes, 2);
        assert_eq!(trained.report.num_features, 4);
        assert!(trained.report.accuracy > 0.9);
        assert!(trained.report.to_string().starts_with("Model Accuracy:"));
        assert_eq!(trained.model.schema().columns(), ["state", "year", "Turnout", "margin"]);
        assert_eq!(trained.model.label_codec(), "party_label_encoder");
        assert_eq!(trained.model.feature_codec("state"), Some("state_label_encoder"));
        for (_, codec) in trained.encoders.artifacts() {
            assert_eq!(codec.run_id(), trained.model.run_id());
        }

        // fit alone never writes artifacts
        assert!(!ArtifactStore::new(dir.path()).exists(MODEL_ARTIFACT));
    }

    #[test]
    fn test_single_class_fails_fast() {
        let dir = TempDir::new().unwrap();
        let err = trainer(&dir).train_table(&table(20, &["INC"])).unwrap_err();
        assert!(matches!(err, PipelineError::Training { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_train_table_persists_all_artifacts() {
        let dir = TempDir::new().unwrap();
        trainer(&dir).train_table(&table(30, &["INC", "BJP", "CPM"])).unwrap();

        let store = ArtifactStore::new(dir.path());
        for name in ["party_label_encoder", "state_label_encoder", MODEL_ARTIFACT] {
            assert!(store.exists(name), "missing {}", name);
        }
        let model: FittedModel = store.load(MODEL_ARTIFACT).unwrap();
        assert_eq!(model.num_classes(), 3);
    }

    #[test]
    fn test_too_few_rows_to_partition() {
        let dir = TempDir::new().unwrap();
        let err = trainer(&dir).fit(&table(1, &["INC", "BJP"])).unwrap_err();
        assert!(matches!(err, PipelineError::Training { .. } | PipelineError::Dataset { .. }));
    }
}
