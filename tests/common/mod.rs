//! Common test utilities for party predictor integration tests.

#![allow(dead_code)]

use party_predictor::core::types::MaxFeatures;
use party_predictor::{ConfigBuilder, ElectionPipeline, PipelineConfig};
use rand::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Parties of the synthetic dataset; each owns a distinct turnout band.
pub const PARTIES: [&str; 3] = ["INC", "BJP", "CPM"];

/// States of the synthetic dataset.
pub const STATES: [&str; 5] = ["Kerala", "Goa", "Assam", "Bihar", "Punjab"];

/// Turnout band centre of a party
pub fn turnout_centre(party: usize) -> f64 {
    45.0 + 15.0 * party as f64
}

/// Create a cleaned election CSV where turnout determines the party.
///
/// Columns are `state,year,Turnout,margin,electors,party`; every 17th row
/// has an empty `electors` cell.
pub fn synthetic_csv(num_rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut csv = String::from("state,year,Turnout,margin,electors,party\n");

    for i in 0..num_rows {
        let party = i % PARTIES.len();
        let state = STATES[rng.gen_range(0..STATES.len())];
        let year = 1962 + 5 * rng.gen_range(0..12);
        let turnout = turnout_centre(party) + rng.gen_range(-4.0..4.0);
        let margin = rng.gen_range(100..50_000);
        let electors = if i % 17 == 0 {
            String::new()
        } else {
            rng.gen_range(500_000..2_000_000).to_string()
        };

        csv.push_str(&format!(
            "{},{},{:.2},{},{},{}\n",
            state, year, turnout, margin, electors, PARTIES[party]
        ));
    }
    csv
}

/// Create a dataset where every row has the same party
pub fn single_party_csv(num_rows: usize) -> String {
    let mut csv = String::from("state,year,Turnout,margin,electors,party\n");
    for i in 0..num_rows {
        csv.push_str(&format!(
            "{},{},60.0,{},1000000,INC\n",
            STATES[i % STATES.len()],
            1962 + i,
            i * 100
        ));
    }
    csv
}

/// Scratch directory with a dataset file and a matching configuration.
pub struct TestEnv {
    pub dir: TempDir,
    pub config: PipelineConfig,
}

impl TestEnv {
    /// Write the synthetic 100-row dataset and configure a small forest
    pub fn new() -> Self {
        Self::with_csv(&synthetic_csv(100, 7))
    }

    /// Write `csv` as the cleaned dataset
    pub fn with_csv(csv: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let dataset_path = dir.path().join("cleaned_loksabha_data.csv");
        fs::write(&dataset_path, csv).expect("write dataset");

        let config = ConfigBuilder::new()
            .dataset_path(dataset_path)
            .raw_dataset_path(dir.path().join("raw.csv"))
            .artifact_dir(dir.path().join("artifacts"))
            .num_trees(20)
            .max_features(MaxFeatures::All)
            .build()
            .expect("valid config");

        TestEnv { dir, config }
    }

    /// Pipeline over this environment
    pub fn pipeline(&self) -> ElectionPipeline {
        ElectionPipeline::new(self.config.clone()).expect("valid pipeline")
    }

    /// Path of an artifact file
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.config.artifact_dir.join(format!("{}.bin", name))
    }
}
