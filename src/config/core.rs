//! Core configuration structures and builder for the pipeline.
//!
//! The configuration covers where the dataset and artifacts live, which
//! columns carry the label and the state, how rows are partitioned, and how
//! the random forest is shaped.

use crate::core::constants::*;
use crate::core::error::{PipelineError, Result};
use crate::core::types::MaxFeatures;
use crate::dataset::cleaning::CleaningConfig;
use crate::dataset::loader::CsvConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Shape of the random forest.
///
/// Tree count and depth are explicit caps that bound training cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub num_trees: usize,
    /// Maximum depth of each tree (None for unlimited)
    pub max_depth: Option<usize>,
    /// Minimum number of samples required to split a node
    pub min_samples_split: usize,
    /// Minimum number of samples in each leaf
    pub min_samples_leaf: usize,
    /// Features considered at each split
    pub max_features: MaxFeatures,
    /// Draw a bootstrap sample for each tree
    pub bootstrap: bool,
    /// Worker threads for fitting trees (0 uses the global rayon pool)
    pub num_threads: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        ForestConfig {
            num_trees: DEFAULT_NUM_TREES,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            min_samples_split: DEFAULT_MIN_SAMPLES_SPLIT,
            min_samples_leaf: DEFAULT_MIN_SAMPLES_LEAF,
            max_features: DEFAULT_MAX_FEATURES,
            bootstrap: true,
            num_threads: 0,
        }
    }
}

impl ForestConfig {
    /// Validate the forest parameters
    pub fn validate(&self) -> Result<()> {
        if self.num_trees == 0 {
            return Err(PipelineError::invalid_parameter(
                "num_trees",
                self.num_trees.to_string(),
                "must be at least 1",
            ));
        }

        if self.max_depth == Some(0) {
            return Err(PipelineError::invalid_parameter(
                "max_depth",
                "0",
                "must be at least 1 when set",
            ));
        }

        if self.min_samples_split < 2 {
            return Err(PipelineError::invalid_parameter(
                "min_samples_split",
                self.min_samples_split.to_string(),
                "must be at least 2",
            ));
        }

        if self.min_samples_leaf < 1 {
            return Err(PipelineError::invalid_parameter(
                "min_samples_leaf",
                self.min_samples_leaf.to_string(),
                "must be at least 1",
            ));
        }

        if let MaxFeatures::Fraction(fraction) = self.max_features {
            if fraction <= 0.0 || fraction > 1.0 {
                return Err(PipelineError::invalid_parameter(
                    "max_features",
                    fraction.to_string(),
                    "fraction must be in range (0.0, 1.0]",
                ));
            }
        }

        Ok(())
    }
}

/// Main configuration structure for training and prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cleaned dataset file
    pub dataset_path: PathBuf,
    /// Raw dataset file consumed by the cleaning stage
    pub raw_dataset_path: PathBuf,
    /// Directory holding persisted codecs and model
    pub artifact_dir: PathBuf,
    /// Label column name
    pub label_column: String,
    /// State column name
    pub state_column: String,
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    /// Seed for partitioning and forest fitting
    pub random_seed: u64,
    /// Random forest parameters
    pub forest: ForestConfig,
    /// CSV reading parameters
    pub csv: CsvConfig,
    /// Raw dataset cleaning rules
    pub cleaning: CleaningConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            raw_dataset_path: PathBuf::from(DEFAULT_RAW_DATASET_PATH),
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            label_column: LABEL_COLUMN.to_string(),
            state_column: STATE_COLUMN.to_string(),
            test_fraction: DEFAULT_TEST_FRACTION,
            random_seed: DEFAULT_RANDOM_SEED,
            forest: ForestConfig::default(),
            csv: CsvConfig::default(),
            cleaning: CleaningConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.test_fraction <= 0.0 || self.test_fraction >= 1.0 {
            return Err(PipelineError::invalid_parameter(
                "test_fraction",
                self.test_fraction.to_string(),
                "must be in range (0.0, 1.0)",
            ));
        }

        if self.label_column.trim().is_empty() {
            return Err(PipelineError::config("label_column must not be empty"));
        }

        if self.state_column.trim().is_empty() {
            return Err(PipelineError::config("state_column must not be empty"));
        }

        if self.label_column == self.state_column {
            return Err(crate::config_error!(
                "label_column and state_column must differ, both are '{}'",
                self.label_column
            ));
        }

        self.forest.validate()?;
        self.csv.validate()?;

        Ok(())
    }

    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::config_error!("Failed to read config file: {}", e))?;

        let config: PipelineConfig =
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                serde_json::from_str(&content)
                    .map_err(|e| crate::config_error!("Failed to parse JSON config: {}", e))?
            } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                toml::from_str(&content)
                    .map_err(|e| crate::config_error!("Failed to parse TOML config: {}", e))?
            } else {
                return Err(PipelineError::config(
                    "Unsupported config file format. Use .json or .toml",
                ));
            };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::config_error!("Failed to serialize to JSON: {}", e))?
        } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::to_string_pretty(self)
                .map_err(|e| crate::config_error!("Failed to serialize to TOML: {}", e))?
        } else {
            return Err(PipelineError::config(
                "Unsupported config file format. Use .json or .toml",
            ));
        };

        std::fs::write(path, content)
            .map_err(|e| crate::config_error!("Failed to write config file: {}", e))?;

        Ok(())
    }

    /// Load configuration from environment variables over the defaults
    pub fn load_from_environment() -> Result<Self> {
        let config = Self::default().with_environment_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PARTY_PREDICTOR_*` environment variables on top of this configuration
    pub fn with_environment_overrides(mut self) -> Result<Self> {
        if let Some(val) = env_var("DATASET_PATH") {
            self.dataset_path = PathBuf::from(val);
        }
        if let Some(val) = env_var("RAW_DATASET_PATH") {
            self.raw_dataset_path = PathBuf::from(val);
        }
        if let Some(val) = env_var("ARTIFACT_DIR") {
            self.artifact_dir = PathBuf::from(val);
        }
        if let Some(val) = env_var("RANDOM_SEED") {
            self.random_seed = parse_env("RANDOM_SEED", &val)?;
        }
        if let Some(val) = env_var("TEST_FRACTION") {
            self.test_fraction = parse_env("TEST_FRACTION", &val)?;
        }
        if let Some(val) = env_var("NUM_TREES") {
            self.forest.num_trees = parse_env("NUM_TREES", &val)?;
        }
        if let Some(val) = env_var("MAX_DEPTH") {
            self.forest.max_depth = match val.as_str() {
                "none" | "None" | "unlimited" => None,
                other => Some(parse_env("MAX_DEPTH", other)?),
            };
        }
        if let Some(val) = env_var("NUM_THREADS") {
            self.forest.num_threads = parse_env("NUM_THREADS", &val)?;
        }

        Ok(self)
    }
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, suffix)).ok()
}

fn parse_env<T: FromStr>(suffix: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        PipelineError::invalid_parameter(
            format!("{}{}", ENV_PREFIX, suffix),
            value,
            "could not be parsed",
        )
    })
}

/// Builder for [`PipelineConfig`] collecting validation errors as it goes.
#[derive(Debug)]
pub struct ConfigBuilder {
    config: PipelineConfig,
    validation_errors: Vec<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        ConfigBuilder {
            config: PipelineConfig::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the cleaned dataset path
    pub fn dataset_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.dataset_path = path.into();
        self
    }

    /// Set the raw dataset path
    pub fn raw_dataset_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.raw_dataset_path = path.into();
        self
    }

    /// Set the artifact directory
    pub fn artifact_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.artifact_dir = dir.into();
        self
    }

    /// Set the label column
    pub fn label_column<S: Into<String>>(mut self, column: S) -> Self {
        self.config.label_column = column.into();
        self
    }

    /// Set the state column
    pub fn state_column<S: Into<String>>(mut self, column: S) -> Self {
        self.config.state_column = column.into();
        self
    }

    /// Set the held-out fraction
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        if fraction <= 0.0 || fraction >= 1.0 {
            self.validation_errors
                .push("test_fraction must be in range (0.0, 1.0)".to_string());
        }
        self.config.test_fraction = fraction;
        self
    }

    /// Set the random seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set the number of trees
    pub fn num_trees(mut self, num_trees: usize) -> Self {
        if num_trees == 0 {
            self.validation_errors
                .push("num_trees must be at least 1".to_string());
        }
        self.config.forest.num_trees = num_trees;
        self
    }

    /// Set the maximum tree depth
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.config.forest.max_depth = depth;
        self
    }

    /// Set the minimum samples needed to split a node
    pub fn min_samples_split(mut self, samples: usize) -> Self {
        self.config.forest.min_samples_split = samples;
        self
    }

    /// Set the minimum samples per leaf
    pub fn min_samples_leaf(mut self, samples: usize) -> Self {
        self.config.forest.min_samples_leaf = samples;
        self
    }

    /// Set per-split feature sampling
    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.config.forest.max_features = max_features;
        self
    }

    /// Enable or disable bootstrap sampling
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.config.forest.bootstrap = bootstrap;
        self
    }

    /// Set the number of worker threads
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.forest.num_threads = threads;
        self
    }

    /// Set the CSV configuration
    pub fn csv(mut self, csv: CsvConfig) -> Self {
        self.config.csv = csv;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        if !self.validation_errors.is_empty() {
            return Err(crate::config_error!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            ));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.forest.num_trees, 100);
        assert_eq!(config.forest.max_depth, Some(10));
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.label_column, "party");
    }

    #[test]
    fn test_builder_collects_errors() {
        let result = ConfigBuilder::new().num_trees(0).test_fraction(1.5).build();
        let err = result.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("num_trees"));
        assert!(message.contains("test_fraction"));
    }

    #[test]
    fn test_builder_sets_values() {
        let config = ConfigBuilder::new()
            .num_trees(25)
            .max_depth(Some(4))
            .random_seed(7)
            .max_features(MaxFeatures::All)
            .build()
            .unwrap();
        assert_eq!(config.forest.num_trees, 25);
        assert_eq!(config.forest.max_depth, Some(4));
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.forest.max_features, MaxFeatures::All);
    }

    #[test]
    fn test_validation_rejects_bad_forest() {
        let mut config = PipelineConfig::default();
        config.forest.max_depth = Some(0);
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.forest.max_features = MaxFeatures::Fraction(1.5);
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.state_column = "party".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.toml");

        let config = ConfigBuilder::new().num_trees(12).random_seed(3).build().unwrap();
        config.save_to_file(&path).unwrap();

        let loaded = PipelineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "random_seed = 9\n[forest]\nnum_trees = 5\n").unwrap();

        let loaded = PipelineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.random_seed, 9);
        assert_eq!(loaded.forest.num_trees, 5);
        assert_eq!(loaded.forest.max_depth, Some(DEFAULT_MAX_DEPTH));
        assert_eq!(loaded.label_column, LABEL_COLUMN);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, "random_seed: 1").unwrap();
        assert!(PipelineConfig::load_from_file(&path).is_err());
    }
}
