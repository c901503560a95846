//! Inference: query assembly and party prediction.

pub mod assembler;
pub mod predictor;
pub mod query;

pub use assembler::FeatureAssembler;
pub use predictor::{LoadedModel, Predictor};
pub use query::Query;
