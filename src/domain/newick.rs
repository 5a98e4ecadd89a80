//! Newick rendering.

use itertools::Itertools;

use crate::domain::tree::{NodeKind, TreeNode};

/// Fixed-point with 6 decimals, trailing zeros and dot stripped.
pub fn format_length(value: f64) -> String {
    let text = format!("{value:.6}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Render a subtree: leaves as `name:length`, branch points as `(a,b):length`.
pub fn to_newick(node: &TreeNode) -> String {
    match &node.kind {
        NodeKind::Leaf { name } => format!("{}:{}", name, format_length(node.length)),
        NodeKind::Internal { children } => format!(
            "({}):{}",
            children.iter().map(to_newick).join(","),
            format_length(node.length)
        ),
    }
}

/// Complete Newick document: the rendered tree, `;` and a newline.
pub fn to_newick_document(tree: &TreeNode) -> String {
    format!("{};\n", to_newick(tree))
}
