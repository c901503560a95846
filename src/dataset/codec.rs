//! Categorical codec.
//!
//! A [`CategoricalCodec`] is a bijection between the distinct strings observed
//! in one column and the dense codes `0..k-1`. Codes follow first-seen order
//! during fitting, not lexical order.
//!
//! Codecs persisted by a training run carry that run's id so a codec is never
//! paired with a model from another run.

use crate::core::error::{PipelineError, Result};
use crate::core::types::{ArtifactKind, CategoryCode};
use crate::io::Artifact;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bijective mapping between the categories of one column and dense codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CodecRepr", into = "CodecRepr")]
pub struct CategoricalCodec {
    column: String,
    classes: Vec<String>,
    run_id: u64,
    index: HashMap<String, CategoryCode>,
}

/// Persisted form: the lookup table is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct CodecRepr {
    column: String,
    classes: Vec<String>,
    run_id: u64,
}

impl TryFrom<CodecRepr> for CategoricalCodec {
    type Error = PipelineError;

    fn try_from(repr: CodecRepr) -> Result<Self> {
        let mut index = HashMap::with_capacity(repr.classes.len());
        for (code, class) in repr.classes.iter().enumerate() {
            if index.insert(class.clone(), code).is_some() {
                return Err(PipelineError::serialization(format!(
                    "codec for column '{}' lists category '{}' twice",
                    repr.column, class
                )));
            }
        }

        Ok(CategoricalCodec {
            column: repr.column,
            classes: repr.classes,
            run_id: repr.run_id,
            index,
        })
    }
}

impl From<CategoricalCodec> for CodecRepr {
    fn from(codec: CategoricalCodec) -> Self {
        CodecRepr {
            column: codec.column,
            classes: codec.classes,
            run_id: codec.run_id,
        }
    }
}

impl Artifact for CategoricalCodec {
    const KIND: ArtifactKind = ArtifactKind::Codec;
}

impl CategoricalCodec {
    /// Fit a codec over `values`, assigning codes in first-seen order.
    pub fn fit<C, I, S>(column: C, values: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes = Vec::new();
        let mut index = HashMap::new();

        for value in values {
            let value = value.as_ref();
            if !index.contains_key(value) {
                index.insert(value.to_string(), classes.len());
                classes.push(value.to_string());
            }
        }

        CategoricalCodec {
            column: column.into(),
            classes,
            run_id: 0,
            index,
        }
    }

    /// Tag the codec with the training run that fitted it.
    pub fn with_run_id(mut self, run_id: u64) -> Self {
        self.run_id = run_id;
        self
    }

    /// Training run that fitted this codec, 0 when untagged
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Encode a single value.
    pub fn encode(&self, value: &str) -> Result<CategoryCode> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| PipelineError::unknown_category(&self.column, value))
    }

    /// Encode every value, failing on the first unknown one.
    pub fn encode_all<I, S>(&self, values: I) -> Result<Vec<CategoryCode>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .map(|value| self.encode(value.as_ref()))
            .collect()
    }

    /// Decode a code back to its category.
    pub fn decode(&self, code: CategoryCode) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| PipelineError::out_of_range(&self.column, code, self.classes.len()))
    }

    /// Column this codec was fitted on
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Categories in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True when the codec saw no values
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// True when `value` was seen during fitting
    pub fn contains(&self, value: &str) -> bool {
        self.index.contains_key(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_seen_order() {
        let codec = CategoricalCodec::fit("party", ["INC", "BJP", "INC", "CPI", "BJP"]);
        assert_eq!(codec.classes(), &["INC", "BJP", "CPI"]);
        assert_eq!(codec.encode("INC").unwrap(), 0);
        assert_eq!(codec.encode("BJP").unwrap(), 1);
        assert_eq!(codec.encode("CPI").unwrap(), 2);
        assert_eq!(codec.len(), 3);
    }

    #[test]
    fn test_unknown_value_fails() {
        let codec = CategoricalCodec::fit("state", ["Kerala", "Goa"]);
        let err = codec.encode("Atlantis").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnknownCategory { ref column, ref value }
                if column == "state" && value == "Atlantis"
        ));
    }

    #[test]
    fn test_decode_out_of_range_fails() {
        let codec = CategoricalCodec::fit("party", ["A", "B"]);
        assert_eq!(codec.decode(1).unwrap(), "B");
        let err = codec.decode(2).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::OutOfRange { index: 2, cardinality: 2, .. }
        ));
    }

    #[test]
    fn test_encode_all_stops_at_unknown() {
        let codec = CategoricalCodec::fit("state", ["Goa", "Assam"]);
        assert_eq!(codec.encode_all(["Assam", "Goa"]).unwrap(), vec![1, 0]);
        assert!(codec.encode_all(["Assam", "Bihar"]).is_err());
    }

    #[test]
    fn test_bincode_round_trip_rebuilds_index() {
        let codec = CategoricalCodec::fit("state", ["Goa", "Assam", "Bihar"]);
        let bytes = bincode::serialize(&codec).unwrap();
        let loaded: CategoricalCodec = bincode::deserialize(&bytes).unwrap();
        assert_eq!(loaded, codec);
        assert_eq!(loaded.encode("Bihar").unwrap(), 2);
    }

    #[test]
    fn test_run_id_survives_round_trip() {
        let codec = CategoricalCodec::fit("party", ["A", "B"]).with_run_id(0xfeed);
        let bytes = bincode::serialize(&codec).unwrap();
        let loaded: CategoricalCodec = bincode::deserialize(&bytes).unwrap();
        assert_eq!(loaded.run_id(), 0xfeed);
        assert_eq!(CategoricalCodec::fit("party", ["A"]).run_id(), 0);
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let json = r#"{"column":"state","classes":["Goa","Goa"],"run_id":0}"#;
        let result: std::result::Result<CategoricalCodec, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip_and_distinct(values in proptest::collection::vec("[a-zA-Z ]{0,8}", 1..40)) {
            let codec = CategoricalCodec::fit("col", &values);
            for v1 in &values {
                let c1 = codec.encode(v1).unwrap();
                prop_assert_eq!(codec.decode(c1).unwrap(), v1.as_str());
                for v2 in &values {
                    if v1 != v2 {
                        prop_assert_ne!(c1, codec.encode(v2).unwrap());
                    }
                }
            }
            prop_assert!(codec.classes().iter().enumerate().all(|(i, c)| codec.encode(c).unwrap() == i));
        }

        #[test]
        fn prop_absent_value_always_fails(values in proptest::collection::vec("[a-z]{1,6}", 1..20), absent in "[A-Z]{1,6}") {
            let codec = CategoricalCodec::fit("col", &values);
            let is_unknown = matches!(codec.encode(&absent), Err(PipelineError::UnknownCategory { .. }));
            prop_assert!(is_unknown);
        }
    }
}
