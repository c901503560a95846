//! Column names, artifact names and configuration defaults.

use crate::core::types::MaxFeatures;

/// Crate version.
pub const PARTY_PREDICTOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Label column holding the winning party.
pub const LABEL_COLUMN: &str = "party";

/// Categorical column holding the state name.
pub const STATE_COLUMN: &str = "state";

/// Election year column.
pub const YEAR_COLUMN: &str = "year";

/// Voter turnout percentage column.
pub const TURNOUT_COLUMN: &str = "Turnout";

/// Victory margin column.
pub const MARGIN_COLUMN: &str = "margin";

/// Columns a query supplies, in the order they are documented.
pub const QUERY_COLUMNS: [&str; 4] = [STATE_COLUMN, YEAR_COLUMN, TURNOUT_COLUMN, MARGIN_COLUMN];

/// Columns a query supplies as raw numbers; always encoded as numeric.
pub const NUMERIC_QUERY_COLUMNS: [&str; 3] = [YEAR_COLUMN, TURNOUT_COLUMN, MARGIN_COLUMN];

/// Columns every cleaned dataset must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    STATE_COLUMN,
    YEAR_COLUMN,
    TURNOUT_COLUMN,
    MARGIN_COLUMN,
    LABEL_COLUMN,
];

/// Suffix appended to a column name to form its codec artifact name.
pub const CODEC_ARTIFACT_SUFFIX: &str = "_label_encoder";

/// Artifact name of the fitted classifier.
pub const MODEL_ARTIFACT: &str = "party_prediction_model";

/// File extension of persisted artifacts.
pub const ARTIFACT_EXTENSION: &str = "bin";

/// Value given to training columns a query does not supply.
pub const DEFAULT_FILL_VALUE: f64 = 0.0;

/// Default cleaned dataset location.
pub const DEFAULT_DATASET_PATH: &str = "cleaned_loksabha_data.csv";

/// Default raw dataset location, input of the cleaning stage.
pub const DEFAULT_RAW_DATASET_PATH: &str = "Loksabha_1962-2019 .csv";

/// Default artifact directory.
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

/// Default number of trees in the forest.
pub const DEFAULT_NUM_TREES: usize = 100;

/// Default maximum tree depth.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default minimum number of samples needed to split a node.
pub const DEFAULT_MIN_SAMPLES_SPLIT: usize = 2;

/// Default minimum number of samples in a leaf.
pub const DEFAULT_MIN_SAMPLES_LEAF: usize = 1;

/// Default per-split feature sampling.
pub const DEFAULT_MAX_FEATURES: MaxFeatures = MaxFeatures::Sqrt;

/// Default fraction of rows held out for evaluation.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Default random seed for reproducible results.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Number of entries reported in "top N" summaries.
pub const DEFAULT_SUMMARY_TOP_N: usize = 10;

/// Number of histogram bins for the margin distribution.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Cell values treated as null when parsing numeric columns.
pub const NULL_TOKENS: [&str; 10] = [
    "", "NA", "N/A", "NaN", "nan", "NULL", "null", "None", "#N/A", "-NaN",
];

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "PARTY_PREDICTOR_";
