//! Inference request.

use crate::core::constants::{MARGIN_COLUMN, TURNOUT_COLUMN, YEAR_COLUMN};
use crate::core::types::FeatureValue;
use serde::{Deserialize, Serialize};

/// One prediction request: a state, a year, a turnout and a margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// State name, encoded with the state codec
    pub state: String,
    /// Election year
    pub year: i32,
    /// Voter turnout percentage
    pub turnout: f64,
    /// Victory margin
    pub margin: f64,
}

impl Query {
    /// Create a query
    pub fn new<S: Into<String>>(state: S, year: i32, turnout: f64, margin: f64) -> Self {
        Query {
            state: state.into(),
            year,
            turnout,
            margin,
        }
    }

    /// Numeric inputs keyed by the dataset column they fill.
    pub fn numeric_values(&self) -> [(&'static str, FeatureValue); 3] {
        [
            (YEAR_COLUMN, FeatureValue::from(self.year)),
            (TURNOUT_COLUMN, self.turnout),
            (MARGIN_COLUMN, self.margin),
        ]
    }
}
