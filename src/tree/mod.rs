//! Tree learning module for the classification forest.
//!
//! This module provides the decision tree structure, its nodes, and the
//! CART learner that grows a tree with Gini impurity splits.

pub mod learner;
pub mod node;
pub mod tree;

// Re-export key types for easy access
pub use learner::{DecisionTreeLearner, SplitInfo, TreeParams};
pub use node::{gini_impurity, TreeNode};
pub use tree::{argmax, Tree};
