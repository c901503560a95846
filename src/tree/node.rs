//! Tree node implementation for the classification trees.
//!
//! This module provides the tree node structure that can represent both
//! internal nodes (with splits) and leaf nodes (with class counts).

use crate::core::types::{FeatureIndex, FeatureValue, NodeIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tree node representation supporting both internal and leaf nodes.
///
/// Every node keeps the class counts of the training samples that reached
/// it; a leaf predicts the normalized counts. Internal nodes route a row left
/// when its split feature is `<= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Left child node index (for internal nodes only)
    left_child: Option<NodeIndex>,
    /// Right child node index (for internal nodes only)
    right_child: Option<NodeIndex>,
    /// Parent node index (None for root node)
    parent: Option<NodeIndex>,
    /// Split feature index (for internal nodes only)
    split_feature: Option<FeatureIndex>,
    /// Split threshold value (for internal nodes only)
    split_threshold: Option<FeatureValue>,
    /// Samples per class that reached this node
    class_counts: Vec<usize>,
    /// Gini impurity of this node
    impurity: f64,
    /// Weighted impurity decrease of the split
    split_gain: f64,
    /// Node depth in the tree
    depth: usize,
    /// Default direction for missing values (true = left, false = right)
    default_left: bool,
}

/// Gini impurity of a class count vector.
pub fn gini_impurity(class_counts: &[usize]) -> f64 {
    let total: usize = class_counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - class_counts
        .iter()
        .map(|&count| {
            let p = count as f64 / total;
            p * p
        })
        .sum::<f64>()
}

impl TreeNode {
    /// Creates a new leaf node with the given class counts.
    pub fn new_leaf(class_counts: Vec<usize>, depth: usize, parent: Option<NodeIndex>) -> Self {
        let impurity = gini_impurity(&class_counts);
        TreeNode {
            left_child: None,
            right_child: None,
            parent,
            split_feature: None,
            split_threshold: None,
            class_counts,
            impurity,
            split_gain: 0.0,
            depth,
            default_left: false,
        }
    }

    /// Returns true if this node is a leaf node.
    pub fn is_leaf(&self) -> bool {
        self.split_feature.is_none()
    }

    /// Returns the left child node index (for internal nodes).
    pub fn left_child(&self) -> Option<NodeIndex> {
        self.left_child
    }

    /// Returns the right child node index (for internal nodes).
    pub fn right_child(&self) -> Option<NodeIndex> {
        self.right_child
    }

    /// Returns the parent node index.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Returns the split feature index (for internal nodes).
    pub fn split_feature(&self) -> Option<FeatureIndex> {
        self.split_feature
    }

    /// Returns the split threshold value (for internal nodes).
    pub fn split_threshold(&self) -> Option<FeatureValue> {
        self.split_threshold
    }

    /// Returns the class counts of this node.
    pub fn class_counts(&self) -> &[usize] {
        &self.class_counts
    }

    /// Returns the number of samples in this node.
    pub fn data_count(&self) -> usize {
        self.class_counts.iter().sum()
    }

    /// Returns the Gini impurity of this node.
    pub fn impurity(&self) -> f64 {
        self.impurity
    }

    /// Returns the split gain value.
    pub fn split_gain(&self) -> f64 {
        self.split_gain
    }

    /// Returns the node depth in the tree.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the default direction for missing values.
    pub fn default_left(&self) -> bool {
        self.default_left
    }

    /// Class probabilities: class counts normalized to sum to one.
    pub fn class_distribution(&self) -> Vec<f64> {
        let total = self.data_count();
        if total == 0 {
            return vec![0.0; self.class_counts.len()];
        }
        self.class_counts
            .iter()
            .map(|&count| count as f64 / total as f64)
            .collect()
    }

    /// Child to follow for `value` of the split feature, or None at a leaf.
    pub fn route(&self, value: FeatureValue) -> Option<NodeIndex> {
        let threshold = self.split_threshold?;
        let go_left = if value.is_nan() {
            self.default_left
        } else {
            value <= threshold
        };
        if go_left {
            self.left_child
        } else {
            self.right_child
        }
    }

    /// Converts this node from leaf to internal node with the given split.
    pub fn set_split(
        &mut self,
        left_child: NodeIndex,
        right_child: NodeIndex,
        split_feature: FeatureIndex,
        split_threshold: FeatureValue,
        split_gain: f64,
        default_left: bool,
    ) {
        self.left_child = Some(left_child);
        self.right_child = Some(right_child);
        self.split_feature = Some(split_feature);
        self.split_threshold = Some(split_threshold);
        self.split_gain = split_gain;
        self.default_left = default_left;
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.split_feature, self.split_threshold) {
            (Some(feature), Some(threshold)) => write!(
                f,
                "Internal(feature={}, threshold={:.4}, gain={:.4}, data_count={})",
                feature,
                threshold,
                self.split_gain,
                self.data_count()
            ),
            _ => write!(
                f,
                "Leaf(counts={:?}, gini={:.4})",
                self.class_counts, self.impurity
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gini_impurity() {
        assert_relative_eq!(gini_impurity(&[5, 0, 0]), 0.0);
        assert_relative_eq!(gini_impurity(&[5, 5]), 0.5);
        assert_relative_eq!(gini_impurity(&[1, 1, 1, 1]), 0.75);
        assert_relative_eq!(gini_impurity(&[0, 0]), 0.0);
    }

    #[test]
    fn test_new_leaf_node() {
        let node = TreeNode::new_leaf(vec![3, 1], 2, Some(0));

        assert!(node.is_leaf());
        assert_eq!(node.data_count(), 4);
        assert_eq!(node.depth(), 2);
        assert_eq!(node.parent(), Some(0));
        assert_eq!(node.class_distribution(), vec![0.75, 0.25]);
        assert!(node.route(1.0).is_none());
    }

    #[test]
    fn test_set_split_and_route() {
        let mut node = TreeNode::new_leaf(vec![2, 2], 0, None);
        node.set_split(1, 2, 3, 2.5, 0.5, false);

        assert!(!node.is_leaf());
        assert_eq!(node.split_feature(), Some(3));
        assert_eq!(node.route(2.5), Some(1));
        assert_eq!(node.route(2.6), Some(2));
        assert_eq!(node.route(f64::NAN), Some(2));
    }

    #[test]
    fn test_display() {
        let node = TreeNode::new_leaf(vec![1, 0], 0, None);
        assert!(node.to_string().starts_with("Leaf"));
    }
}
