//! Random binary trees over sample identifiers.
//!
//! Every node is exclusively owned by its parent, so plain recursion over
//! `Box`ed children covers building, distance accumulation and the
//! ultrametric pass.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument, trace};

use crate::domain::error::DomainError;

/// Branch length range for leaves.
pub const LEAF_LENGTH_RANGE: (f64, f64) = (0.02, 0.3);
/// Branch length range for internal nodes.
pub const INTERNAL_LENGTH_RANGE: (f64, f64) = (0.02, 0.2);

/// Leaf or branch point.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A sample; always named.
    Leaf { name: String },
    /// An unnamed branch point with exactly two ordered children.
    Internal { children: Box<[TreeNode; 2]> },
}

/// Node of a rooted binary tree with branch lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Distance to the parent (non-negative).
    pub length: f64,
    pub kind: NodeKind,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>, length: f64) -> Self {
        Self {
            length,
            kind: NodeKind::Leaf { name: name.into() },
        }
    }

    pub fn internal(left: TreeNode, right: TreeNode, length: f64) -> Self {
        Self {
            length,
            kind: NodeKind::Internal {
                children: Box::new([left, right]),
            },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Sample name for leaves, `None` for branch points.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf { name } => Some(name),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Direct children; empty for leaves.
    pub fn children(&self) -> &[TreeNode] {
        match &self.kind {
            NodeKind::Leaf { .. } => &[],
            NodeKind::Internal { children } => children.as_slice(),
        }
    }

    fn children_mut(&mut self) -> &mut [TreeNode] {
        match &mut self.kind {
            NodeKind::Leaf { .. } => &mut [],
            NodeKind::Internal { children } => children.as_mut_slice(),
        }
    }

    /// Leaf names in left-to-right order.
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_leaf_names(&mut names);
        names
    }

    fn collect_leaf_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            NodeKind::Leaf { name } => out.push(name),
            NodeKind::Internal { children } => {
                for child in children.iter() {
                    child.collect_leaf_names(out);
                }
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { .. } => 1,
            NodeKind::Internal { children } => children.iter().map(TreeNode::leaf_count).sum(),
        }
    }

    /// Number of node levels on the longest root-to-leaf path (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(0)
    }

    /// Accumulated root-to-leaf distances in leaf order.
    ///
    /// The root's own branch length counts toward every distance.
    pub fn leaf_distances(&self) -> Vec<f64> {
        let mut distances = Vec::new();
        self.collect_distances(0.0, &mut distances);
        distances
    }

    fn collect_distances(&self, parent_dist: f64, out: &mut Vec<f64>) {
        let current = parent_dist + self.length;
        if self.is_leaf() {
            out.push(current);
            return;
        }
        for child in self.children() {
            child.collect_distances(current, out);
        }
    }

    /// Pad terminal branches so every leaf sits exactly `target` from the root.
    ///
    /// Internal branch lengths are never touched. Leaves already at or beyond
    /// `target` keep their length.
    pub fn adjust_to_ultrametric(&mut self, target: f64) {
        self.adjust_from(target, 0.0);
    }

    fn adjust_from(&mut self, target: f64, parent_dist: f64) {
        let current = parent_dist + self.length;
        if self.is_leaf() {
            self.length += (target - current).max(0.0);
            return;
        }
        for child in self.children_mut() {
            child.adjust_from(target, current);
        }
    }
}

/// Make the tree ultrametric using its current maximum leaf distance as target.
///
/// Returns the target distance.
#[instrument(level = "debug", skip(tree))]
pub fn make_ultrametric(tree: &mut TreeNode) -> f64 {
    let target = tree
        .leaf_distances()
        .into_iter()
        .fold(0.0_f64, f64::max);
    debug!(target, "adjusting terminal branches");
    tree.adjust_to_ultrametric(target);
    target
}

/// Build a random binary tree whose leaves are exactly `sample_ids`.
///
/// The slice is shuffled in place while partitioning. A fixed rng state
/// always yields the same tree.
#[instrument(level = "debug", skip(sample_ids, rng), fields(samples = sample_ids.len()))]
pub fn build_random_tree<R: Rng + ?Sized>(
    sample_ids: &mut [String],
    rng: &mut R,
) -> Result<TreeNode, DomainError> {
    if sample_ids.is_empty() {
        return Err(DomainError::EmptyTree);
    }
    Ok(build_subtree(sample_ids, rng))
}

fn build_subtree<R: Rng + ?Sized>(ids: &mut [String], rng: &mut R) -> TreeNode {
    if let [only] = ids {
        let (lo, hi) = LEAF_LENGTH_RANGE;
        return TreeNode::leaf(only.clone(), rng.random_range(lo..=hi));
    }

    let split = rng.random_range(1..ids.len());
    ids.shuffle(rng);
    trace!(size = ids.len(), split, "partition");

    let (left_ids, right_ids) = ids.split_at_mut(split);
    let left = build_subtree(left_ids, rng);
    let right = build_subtree(right_ids, rng);
    let (lo, hi) = INTERNAL_LENGTH_RANGE;
    TreeNode::internal(left, right, rng.random_range(lo..=hi))
}
