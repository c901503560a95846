//! Configuration management for the pipeline.

pub mod core;

pub use self::core::{ConfigBuilder, ForestConfig, PipelineConfig};
