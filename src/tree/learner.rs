//! CART tree learner.
//!
//! Grows a classification tree depth-first with an explicit work stack,
//! choosing at every node the threshold split with the largest Gini impurity
//! decrease among a random subset of features.

use crate::config::ForestConfig;
use crate::core::error::{PipelineError, Result};
use crate::core::types::{ClassIndex, FeatureIndex, FeatureValue, MaxFeatures, NodeIndex};
use crate::tree::node::gini_impurity;
use crate::tree::tree::Tree;
use ndarray::{ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::Rng;

/// Parameters controlling the growth of a single tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    /// Maximum depth (None for unlimited)
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it is split
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
    /// Features considered at each split
    pub max_features: MaxFeatures,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams::from(&ForestConfig::default())
    }
}

impl From<&ForestConfig> for TreeParams {
    fn from(config: &ForestConfig) -> Self {
        TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: config.max_features,
        }
    }
}

/// Best split found for a node.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    /// Feature index for the split
    pub feature: FeatureIndex,
    /// Rows with `value <= threshold` go left
    pub threshold: FeatureValue,
    /// Weighted impurity decrease
    pub gain: f64,
    /// Class counts of the left child, missing values included
    pub left_counts: Vec<usize>,
    /// Class counts of the right child, missing values included
    pub right_counts: Vec<usize>,
    /// Missing values go left
    pub default_left: bool,
}

/// Builds one classification tree from a sample of rows.
#[derive(Debug, Clone)]
pub struct DecisionTreeLearner {
    params: TreeParams,
    num_classes: usize,
}

impl DecisionTreeLearner {
    /// Create a learner for `num_classes` classes.
    pub fn new(params: TreeParams, num_classes: usize) -> Result<Self> {
        if num_classes == 0 {
            return Err(PipelineError::training("cannot grow a tree with zero classes"));
        }
        if params.min_samples_split < 2 {
            return Err(PipelineError::invalid_parameter(
                "min_samples_split",
                params.min_samples_split.to_string(),
                "must be at least 2",
            ));
        }
        if params.min_samples_leaf < 1 {
            return Err(PipelineError::invalid_parameter(
                "min_samples_leaf",
                "0",
                "must be at least 1",
            ));
        }
        Ok(DecisionTreeLearner {
            params,
            num_classes,
        })
    }

    /// Learner parameters
    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// Grow a tree over `samples`, row indices into `features` that may repeat.
    pub fn fit<R: Rng>(
        &self,
        features: ArrayView2<'_, FeatureValue>,
        labels: ArrayView1<'_, ClassIndex>,
        samples: &[usize],
        rng: &mut R,
    ) -> Result<Tree> {
        if features.nrows() != labels.len() {
            return Err(crate::training_error!(
                "feature rows ({}) and labels ({}) differ",
                features.nrows(),
                labels.len()
            ));
        }
        if samples.is_empty() {
            return Err(PipelineError::training("cannot grow a tree from zero samples"));
        }
        if let Some(&row) = samples.iter().find(|&&row| row >= labels.len()) {
            return Err(crate::training_error!(
                "sample row {} out of bounds for {} rows",
                row,
                labels.len()
            ));
        }
        if let Some(&label) = labels.iter().find(|&&label| label >= self.num_classes) {
            return Err(PipelineError::out_of_range("label", label, self.num_classes));
        }

        let num_features = features.ncols();
        if num_features == 0 {
            return Err(PipelineError::training("cannot grow a tree without features"));
        }
        let features_per_split = self.params.max_features.resolve(num_features);
        let mut feature_order: Vec<FeatureIndex> = (0..num_features).collect();

        let mut tree = Tree::new(self.class_counts(labels, samples));
        let mut stack: Vec<(NodeIndex, Vec<usize>)> = vec![(0, samples.to_vec())];

        while let Some((node_index, rows)) = stack.pop() {
            let Some(node) = tree.node(node_index) else {
                continue;
            };
            if !self.should_split(rows.len(), node.depth(), node.impurity()) {
                continue;
            }

            feature_order.shuffle(rng);
            let Some(split) = self.find_best_split(
                features,
                labels,
                &rows,
                node.impurity(),
                &feature_order,
                features_per_split,
            ) else {
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
                rows.iter().copied().partition(|&row| {
                    let value = features[[row, split.feature]];
                    if value.is_nan() {
                        split.default_left
                    } else {
                        value <= split.threshold
                    }
                });

            let (left, right) = tree.split_node(
                node_index,
                split.feature,
                split.threshold,
                split.gain,
                split.left_counts,
                split.right_counts,
                split.default_left,
            )?;

            stack.push((right, right_rows));
            stack.push((left, left_rows));
        }

        log::trace!("Grew {}", tree);
        Ok(tree)
    }

    fn class_counts(&self, labels: ArrayView1<'_, ClassIndex>, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.num_classes];
        for &row in rows {
            counts[labels[row]] += 1;
        }
        counts
    }

    fn should_split(&self, num_rows: usize, depth: usize, impurity: f64) -> bool {
        if let Some(max_depth) = self.params.max_depth {
            if depth >= max_depth {
                return false;
            }
        }
        num_rows >= self.params.min_samples_split
            && num_rows >= 2 * self.params.min_samples_leaf
            && impurity > 0.0
    }

    /// Best split over the first `max_features` non-constant features of
    /// `order`; the first best wins on equal gain.
    fn find_best_split(
        &self,
        features: ArrayView2<'_, FeatureValue>,
        labels: ArrayView1<'_, ClassIndex>,
        rows: &[usize],
        parent_impurity: f64,
        order: &[FeatureIndex],
        max_features: usize,
    ) -> Option<SplitInfo> {
        let mut best: Option<SplitInfo> = None;
        let mut visited = 0;

        for &feature in order {
            if visited >= max_features {
                break;
            }
            let Some(candidate) =
                self.best_split_for_feature(features, labels, rows, parent_impurity, feature)
            else {
                continue;
            };
            visited += 1;

            if let Some(split) = candidate {
                if best.as_ref().map_or(true, |b| split.gain > b.gain) {
                    best = Some(split);
                }
            }
        }

        best
    }

    /// Scan one feature. Returns None when the feature is constant over
    /// `rows`, otherwise its best split if any improves impurity.
    fn best_split_for_feature(
        &self,
        features: ArrayView2<'_, FeatureValue>,
        labels: ArrayView1<'_, ClassIndex>,
        rows: &[usize],
        parent_impurity: f64,
        feature: FeatureIndex,
    ) -> Option<Option<SplitInfo>> {
        let mut present: Vec<(FeatureValue, ClassIndex)> = Vec::with_capacity(rows.len());
        let mut missing_counts = vec![0; self.num_classes];
        for &row in rows {
            let value = features[[row, feature]];
            if value.is_nan() {
                missing_counts[labels[row]] += 1;
            } else {
                present.push((value, labels[row]));
            }
        }
        present.sort_by(|a, b| a.0.total_cmp(&b.0));
        match (present.first(), present.last()) {
            (Some(first), Some(last)) if first.0 < last.0 => {}
            _ => return None,
        }

        let num_missing: usize = missing_counts.iter().sum();
        let total = rows.len() as f64;
        let min_leaf = self.params.min_samples_leaf;

        let mut right_counts = vec![0; self.num_classes];
        for &(_, label) in &present {
            right_counts[label] += 1;
        }
        let mut left_counts = vec![0; self.num_classes];

        let mut best: Option<SplitInfo> = None;
        for i in 0..present.len() - 1 {
            let (value, label) = present[i];
            left_counts[label] += 1;
            right_counts[label] -= 1;

            let next_value = present[i + 1].0;
            if next_value <= value {
                continue;
            }

            let num_left = i + 1;
            let num_right = present.len() - num_left;
            // missing values follow the larger side
            let default_left = num_left >= num_right;
            let (left_total, right_total) = if default_left {
                (num_left + num_missing, num_right)
            } else {
                (num_left, num_right + num_missing)
            };
            if left_total < min_leaf || right_total < min_leaf {
                continue;
            }

            let (left, right) = with_missing(&left_counts, &right_counts, &missing_counts, default_left);
            let gain = parent_impurity
                - (left_total as f64 / total) * gini_impurity(&left)
                - (right_total as f64 / total) * gini_impurity(&right);

            if gain > 0.0 && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(SplitInfo {
                    feature,
                    threshold: midpoint(value, next_value),
                    gain,
                    left_counts: left,
                    right_counts: right,
                    default_left,
                });
            }
        }

        Some(best)
    }
}

fn with_missing(
    left: &[usize],
    right: &[usize],
    missing: &[usize],
    default_left: bool,
) -> (Vec<usize>, Vec<usize>) {
    let add = |side: &[usize]| -> Vec<usize> { side.iter().zip(missing).map(|(a, b)| a + b).collect() };
    if default_left {
        (add(left), right.to_vec())
    } else {
        (left.to_vec(), add(right))
    }
}

/// Threshold between two adjacent distinct values, never equal to the upper one.
fn midpoint(lower: FeatureValue, upper: FeatureValue) -> FeatureValue {
    let mid = lower + (upper - lower) / 2.0;
    if mid >= upper || !mid.is_finite() {
        lower
    } else {
        mid
    }
}
