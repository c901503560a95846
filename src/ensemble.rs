//! Random forest classifier.
//!
//! Bags [`DecisionTreeLearner`] trees over bootstrap samples and averages
//! their leaf class distributions. Trees are fitted in parallel with rayon;
//! every tree's seed is drawn up front from the master seed so the fitted
//! forest does not depend on the thread count.

use crate::config::ForestConfig;
use crate::core::error::{PipelineError, Result};
use crate::core::types::{ClassIndex, FeatureValue};
use crate::dataset::Dataset;
use crate::tree::{argmax, DecisionTreeLearner, Tree, TreeParams};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bagged ensemble of classification trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    config: ForestConfig,
    seed: u64,
    num_classes: usize,
    num_features: usize,
    trees: Vec<Tree>,
}

impl RandomForestClassifier {
    /// Fit a forest on every row of `dataset`.
    pub fn fit(config: &ForestConfig, seed: u64, dataset: &Dataset) -> Result<Self> {
        config.validate()?;

        let num_data = dataset.num_data();
        let num_classes = dataset.num_classes();
        if num_data == 0 {
            return Err(PipelineError::training("cannot fit a forest on zero rows"));
        }

        let learner = DecisionTreeLearner::new(TreeParams::from(config), num_classes)?;
        let features = dataset.features();
        let labels = dataset.labels();

        let mut master = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..config.num_trees).map(|_| master.gen()).collect();

        let fit_tree = |tree_seed: &u64| -> Result<Tree> {
            let mut rng = StdRng::seed_from_u64(*tree_seed);
            let samples: Vec<usize> = if config.bootstrap {
                (0..num_data).map(|_| rng.gen_range(0..num_data)).collect()
            } else {
                (0..num_data).collect()
            };
            learner.fit(features, labels, &samples, &mut rng)
        };

        log::info!(
            "Fitting random forest: {} trees, max_depth {:?}, {} rows, {} features, {} classes",
            config.num_trees,
            config.max_depth,
            num_data,
            dataset.num_features(),
            num_classes
        );

        let trees: Vec<Tree> = if config.num_threads > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(config.num_threads)
                .build()
                .map_err(|e| crate::training_error!("failed to build thread pool: {}", e))?;
            pool.install(|| tree_seeds.par_iter().map(fit_tree).collect::<Result<Vec<_>>>())?
        } else {
            tree_seeds.par_iter().map(fit_tree).collect::<Result<Vec<_>>>()?
        };

        for (index, tree) in trees.iter().enumerate() {
            log::debug!("Tree {}: {}", index, tree);
        }

        Ok(RandomForestClassifier {
            config: config.clone(),
            seed,
            num_classes,
            num_features: dataset.num_features(),
            trees,
        })
    }

    /// Number of trees
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Number of features every row must have
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Fitted trees
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Parameters the forest was fitted with
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Master seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Mean class distribution over all trees for one row.
    pub fn predict_proba(&self, row: &ArrayView1<'_, FeatureValue>) -> Result<Array1<f64>> {
        if row.len() != self.num_features {
            return Err(PipelineError::schema_mismatch(format!(
                "row has {} features, model was fitted on {}",
                row.len(),
                self.num_features
            )));
        }
        if self.trees.is_empty() {
            return Err(PipelineError::training("forest has no trees"));
        }

        let mut proba = Array1::<f64>::zeros(self.num_classes);
        for tree in &self.trees {
            proba += &tree.predict_proba(row)?;
        }
        proba /= self.trees.len() as f64;
        Ok(proba)
    }

    /// Most probable class for one row, lowest index on ties.
    pub fn predict(&self, row: &ArrayView1<'_, FeatureValue>) -> Result<ClassIndex> {
        Ok(argmax(self.predict_proba(row)?.view()))
    }

    /// Predicted class for every row.
    pub fn predict_batch(&self, features: ArrayView2<'_, FeatureValue>) -> Result<Array1<ClassIndex>> {
        let predictions = (0..features.nrows())
            .into_par_iter()
            .map(|i| self.predict(&features.row(i)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Array1::from(predictions))
    }

    /// Mean impurity-based importance per feature, normalized to sum to one.
    pub fn feature_importance(&self) -> Array1<f64> {
        let mut importance = Array1::<f64>::zeros(self.num_features);
        for tree in &self.trees {
            importance += &tree.feature_importance(self.num_features);
        }
        let total = importance.sum();
        if total > 0.0 {
            importance /= total;
        }
        importance
    }
}

impl fmt::Display for RandomForestClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RandomForest(trees={}, classes={}, features={})",
            self.num_trees(),
            self.num_classes,
            self.num_features
        )
    }
}
