//! Decision tree implementation for the classification forest.
//!
//! This module provides the core decision tree structure with prediction,
//! serialization, and tree manipulation capabilities.

use crate::core::error::{PipelineError, Result};
use crate::core::types::{ClassIndex, FeatureIndex, FeatureValue, NodeIndex};
use crate::tree::node::TreeNode;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision tree structure representing a single tree in the forest.
///
/// The tree stores nodes in a contiguous vector (index 0 is the root) and
/// children are always appended after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Vector of tree nodes (index 0 is always the root)
    nodes: Vec<TreeNode>,
    /// Number of classes every node's counts cover
    num_classes: usize,
    /// Current number of leaf nodes
    num_leaves: usize,
    /// Maximum depth of any node
    max_depth: usize,
}

impl Tree {
    /// Creates a new tree with a single root leaf.
    pub fn new(root_counts: Vec<usize>) -> Self {
        let num_classes = root_counts.len();
        Tree {
            nodes: vec![TreeNode::new_leaf(root_counts, 0, None)],
            num_classes,
            num_leaves: 1,
            max_depth: 0,
        }
    }

    /// Returns the number of nodes in the tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Returns the number of classes.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Returns the tree depth (maximum depth of any node).
    pub fn depth(&self) -> usize {
        self.max_depth
    }

    /// Returns a reference to the node at the given index.
    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// Returns the root node of the tree.
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// Index of the leaf reached by `features`.
    pub fn predict_leaf_index(&self, features: &ArrayView1<'_, FeatureValue>) -> Result<NodeIndex> {
        let mut node_index = 0;

        loop {
            let node = self.nodes.get(node_index).ok_or_else(|| {
                crate::training_error!("tree references missing node {}", node_index)
            })?;

            let Some(feature) = node.split_feature() else {
                return Ok(node_index);
            };

            let value = *features.get(feature).ok_or_else(|| {
                PipelineError::schema_mismatch(format!(
                    "tree splits on feature {} but the row has {} values",
                    feature,
                    features.len()
                ))
            })?;

            node_index = node.route(value).ok_or_else(|| {
                crate::training_error!("internal node {} has no child", node_index)
            })?;
        }
    }

    /// Class probabilities for a single row.
    pub fn predict_proba(&self, features: &ArrayView1<'_, FeatureValue>) -> Result<Array1<f64>> {
        let leaf = self.predict_leaf_index(features)?;
        Ok(Array1::from(self.nodes[leaf].class_distribution()))
    }

    /// Most probable class for a single row, lowest index on ties.
    pub fn predict(&self, features: &ArrayView1<'_, FeatureValue>) -> Result<ClassIndex> {
        let proba = self.predict_proba(features)?;
        Ok(argmax(proba.view()))
    }

    /// Splits a leaf node into an internal node with two children.
    #[allow(clippy::too_many_arguments)]
    pub fn split_node(
        &mut self,
        node_index: NodeIndex,
        split_feature: FeatureIndex,
        split_threshold: FeatureValue,
        split_gain: f64,
        left_counts: Vec<usize>,
        right_counts: Vec<usize>,
        default_left: bool,
    ) -> Result<(NodeIndex, NodeIndex)> {
        let parent = self.nodes.get(node_index).ok_or_else(|| {
            crate::training_error!("node index {} out of bounds", node_index)
        })?;

        if !parent.is_leaf() {
            return Err(PipelineError::training("cannot split non-leaf node"));
        }

        if left_counts.len() != self.num_classes || right_counts.len() != self.num_classes {
            return Err(crate::training_error!(
                "child class counts must cover {} classes",
                self.num_classes
            ));
        }

        let child_depth = parent.depth() + 1;
        self.max_depth = self.max_depth.max(child_depth);

        let left_child_index = self.nodes.len();
        let right_child_index = self.nodes.len() + 1;

        self.nodes
            .push(TreeNode::new_leaf(left_counts, child_depth, Some(node_index)));
        self.nodes
            .push(TreeNode::new_leaf(right_counts, child_depth, Some(node_index)));

        self.nodes[node_index].set_split(
            left_child_index,
            right_child_index,
            split_feature,
            split_threshold,
            split_gain,
            default_left,
        );

        // Added 2 leaves, removed 1
        self.num_leaves += 1;

        Ok((left_child_index, right_child_index))
    }

    /// Returns all leaf node indices.
    pub fn leaf_indices(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| if node.is_leaf() { Some(i) } else { None })
            .collect()
    }

    /// Impurity-based feature importance: weighted impurity decrease per feature.
    pub fn feature_importance(&self, num_features: usize) -> Array1<f64> {
        let mut importance = Array1::zeros(num_features);
        let root_count = self.root().data_count().max(1) as f64;

        for node in &self.nodes {
            if let Some(feature) = node.split_feature() {
                if feature < num_features {
                    importance[feature] +=
                        node.split_gain() * node.data_count() as f64 / root_count;
                }
            }
        }

        importance
    }

    /// Returns a textual representation of the tree structure.
    pub fn to_string_representation(&self) -> String {
        let mut result = String::new();
        self.tree_to_string_recursive(0, "", true, &mut result);
        result
    }

    fn tree_to_string_recursive(
        &self,
        node_index: NodeIndex,
        prefix: &str,
        is_last: bool,
        result: &mut String,
    ) {
        let Some(node) = self.nodes.get(node_index) else {
            return;
        };

        let current_prefix = if is_last { "└── " } else { "├── " };
        result.push_str(&format!("{}{}{}\n", prefix, current_prefix, node));

        let new_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        if let Some(left_child) = node.left_child() {
            self.tree_to_string_recursive(left_child, &new_prefix, false, result);
        }
        if let Some(right_child) = node.right_child() {
            self.tree_to_string_recursive(right_child, &new_prefix, true, result);
        }
    }

    /// Validates the tree structure consistency.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(PipelineError::training("tree has no nodes"));
        }

        if self.nodes[0].parent().is_some() {
            return Err(PipelineError::training("root node should not have a parent"));
        }

        let mut leaf_count = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.class_counts().len() != self.num_classes {
                return Err(crate::training_error!(
                    "node {} has counts for {} classes, expected {}",
                    i,
                    node.class_counts().len(),
                    self.num_classes
                ));
            }

            if node.is_leaf() {
                leaf_count += 1;
                if node.left_child().is_some() || node.right_child().is_some() {
                    return Err(crate::training_error!("leaf node {} has children", i));
                }
                continue;
            }

            let (Some(left), Some(right)) = (node.left_child(), node.right_child()) else {
                return Err(crate::training_error!(
                    "internal node {} missing children",
                    i
                ));
            };

            for child in [left, right] {
                match self.nodes.get(child) {
                    Some(child_node) if child > i && child_node.parent() == Some(i) => {}
                    _ => {
                        return Err(crate::training_error!(
                            "node {} has invalid child {}",
                            i, child
                        ))
                    }
                }
            }
        }

        if leaf_count != self.num_leaves {
            return Err(crate::training_error!(
                "leaf count mismatch: expected {}, found {}",
                self.num_leaves, leaf_count
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tree(nodes={}, leaves={}, depth={}, classes={})",
            self.num_nodes(),
            self.num_leaves(),
            self.depth(),
            self.num_classes()
        )
    }
}

/// Index of the largest value, lowest index on ties.
pub fn argmax(values: ArrayView1<'_, f64>) -> ClassIndex {
    let mut best = 0;
    for (index, &value) in values.iter().enumerate() {
        if value > values[best] {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn stump() -> Tree {
        // feature[0] <= 2.5 -> class 0, else class 1
        let mut tree = Tree::new(vec![6, 4]);
        tree.split_node(0, 0, 2.5, 0.48, vec![6, 0], vec![0, 4], false)
            .unwrap();
        tree
    }

    #[test]
    fn test_new_tree() {
        let tree = Tree::new(vec![3, 2]);
        assert_eq!(tree.num_nodes(), 1);
        assert_eq!(tree.num_leaves(), 1);
        assert_eq!(tree.depth(), 0);
        assert!(tree.root().is_leaf());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_split_node() {
        let tree = stump();
        assert_eq!(tree.num_nodes(), 3);
        assert_eq!(tree.num_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.root().split_feature(), Some(0));
        assert_eq!(tree.leaf_indices(), vec![1, 2]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_split_rejects_internal_and_bad_counts() {
        let mut tree = stump();
        assert!(tree
            .split_node(0, 0, 1.0, 0.1, vec![1, 0], vec![0, 1], true)
            .is_err());
        assert!(tree
            .split_node(1, 0, 1.0, 0.1, vec![1], vec![0, 1], true)
            .is_err());
    }

    #[test]
    fn test_predict() {
        let tree = stump();
        assert_eq!(tree.predict(&array![2.0, 9.0].view()).unwrap(), 0);
        assert_eq!(tree.predict(&array![3.0, 9.0].view()).unwrap(), 1);
        assert_eq!(tree.predict_leaf_index(&array![2.5].view()).unwrap(), 1);
        assert_eq!(
            tree.predict_proba(&array![3.0].view()).unwrap().to_vec(),
            vec![0.0, 1.0]
        );
    }

    #[test]
    fn test_predict_short_row_fails() {
        let mut tree = Tree::new(vec![1, 1]);
        tree.split_node(0, 3, 0.5, 0.5, vec![1, 0], vec![0, 1], true)
            .unwrap();
        let result = tree.predict(&array![1.0].view());
        assert!(matches!(result, Err(PipelineError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_argmax_ties_take_lowest_index() {
        assert_eq!(argmax(array![0.2, 0.4, 0.4].view()), 1);
        assert_eq!(argmax(array![0.5, 0.5].view()), 0);
    }

    #[test]
    fn test_feature_importance() {
        let importance = stump().feature_importance(3);
        assert_relative_eq!(importance[0], 0.48);
        assert_eq!(importance[1], 0.0);
    }

    #[test]
    fn test_serialization() {
        let tree = stump();
        let bytes = bincode::serialize(&tree).unwrap();
        let restored: Tree = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, tree);
        assert!(tree.to_string_representation().contains("Internal"));
    }
}
