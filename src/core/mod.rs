//! Core infrastructure module for the party prediction pipeline.
//!
//! # Organization
//!
//! - [`types`]: Fundamental data types and enumerations
//! - [`constants`]: Column names, artifact names and configuration defaults
//! - [`error`]: Error types shared by every component
//!
//! ```rust
//! use party_predictor::core::{
//!     constants::{LABEL_COLUMN, DEFAULT_NUM_TREES},
//!     error::{PipelineError, Result},
//!     types::ColumnKind,
//! };
//!
//! let err = PipelineError::unknown_category("state", "Atlantis");
//! assert_eq!(err.category(), "unknown_category");
//! assert_eq!(LABEL_COLUMN, "party");
//! assert_eq!(DEFAULT_NUM_TREES, 100);
//! # let _ = ColumnKind::Numeric;
//! ```

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{PipelineError, PredictionError, Result};
pub use types::*;

use std::sync::Once;

static LOGGING: Once = Once::new();

/// Initialize the logging subsystem.
///
/// Uses `RUST_LOG` when set, `info` otherwise. Safe to call repeatedly.
pub fn initialize_logging() {
    LOGGING.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        // Another logger may already be installed by the embedding application.
        let _ = env_logger::Builder::from_env(env).try_init();
    });
}
