//! Fitting, evaluating and persisting the party classifier.

pub mod model;
pub mod trainer;

pub use model::FittedModel;
pub use trainer::{ClassifierTrainer, TrainedPipeline, TrainingReport};
