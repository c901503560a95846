//! Input/Output operations for persisted artifacts and datasets.
//!
//! This module provides the directory-backed [`ArtifactStore`] for codecs and
//! models, and atomic file replacement for the cleaned dataset.

pub mod artifact_store;

pub use artifact_store::{write_file_atomic, Artifact, ArtifactStore, StagedArtifact};
