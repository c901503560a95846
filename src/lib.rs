//! # Party Predictor
//!
//! Predicts the winning party of a parliamentary constituency from its
//! state, election year, voter turnout and victory margin, using a random
//! forest fitted on historical election results.
//!
//! ## Pipeline
//!
//! - **Cleaning**: the raw election export is normalized into a cleaned CSV
//!   (thousands separators and `%` signs stripped, years coerced).
//! - **Encoding**: every categorical column, the `party` label included, gets
//!   its own [`CategoricalCodec`] mapping strings to dense codes in first-seen
//!   order.
//! - **Training**: rows are split 80/20 with a seeded shuffle, a forest of
//!   Gini trees is fitted on the training rows and evaluated on the held-out
//!   rows.
//! - **Persistence**: codecs and model are written to an [`ArtifactStore`]
//!   only after training succeeded, each file replaced atomically.
//! - **Prediction**: a [`Query`] is assembled into a row ordered exactly like
//!   the training schema, classified, and decoded back to a party name.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use party_predictor::{ConfigBuilder, ElectionPipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! party_predictor::init();
//!
//! let config = ConfigBuilder::new()
//!     .dataset_path("cleaned_loksabha_data.csv")
//!     .artifact_dir("artifacts")
//!     .build()?;
//! let pipeline = ElectionPipeline::new(config)?;
//!
//! let report = pipeline.train()?;
//! println!("{}", report);
//!
//! let party = pipeline.predict("Kerala", 2019, 77.8, 12.5)?;
//! println!("Predicted party: {}", party);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`core`]: Error types, constants and shared type aliases
//! - [`config`]: Pipeline and forest configuration
//! - [`dataset`]: CSV loading, cleaning, encoding, partitioning and summaries
//! - [`tree`]: CART classification trees
//! - [`ensemble`]: The random forest classifier
//! - [`metrics`]: Accuracy and per-class classification report
//! - [`io`]: Artifact persistence
//! - [`training`]: Fitting and persisting the classifier
//! - [`prediction`]: Feature assembly and party prediction
//! - [`pipeline`]: The front-end facade

#![warn(missing_docs)]
#![warn(missing_debug_implementations, rust_2018_idioms, non_snake_case, non_upper_case_globals)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Dataset management module
pub mod dataset;

// Decision tree module
pub mod tree;

// Random forest module
pub mod ensemble;

// Metrics evaluation module
pub mod metrics;

// Artifact persistence module
pub mod io;

// Training module
pub mod training;

// Prediction module
pub mod prediction;

// Front-end facade
pub mod pipeline;

// Re-export core functionality for convenience
pub use core::{
    constants::*,
    error::{PipelineError, PredictionError, Result},
    types::*,
};

// Re-export configuration functionality
pub use config::{ConfigBuilder, ForestConfig, PipelineConfig};

// Re-export dataset functionality
pub use dataset::{
    CategoricalCodec, CsvConfig, CsvLoader, Dataset, DatasetCleaner, DatasetSummary,
    TableEncoder, TrainingSchema,
};

// Re-export model functionality
pub use ensemble::RandomForestClassifier;
pub use metrics::ClassificationReport;
pub use io::ArtifactStore;
pub use training::{ClassifierTrainer, FittedModel, TrainingReport};
pub use prediction::{FeatureAssembler, Predictor, Query};
pub use pipeline::ElectionPipeline;

// Version information
pub use core::constants::PARTY_PREDICTOR_VERSION as VERSION;

/// Initialize the library.
///
/// Sets up `env_logger` with `RUST_LOG`, defaulting to `info`. Calling it
/// more than once is harmless.
///
/// # Examples
///
/// ```rust
/// party_predictor::init();
/// log::info!("ready");
/// ```
pub fn init() {
    core::initialize_logging();
}
