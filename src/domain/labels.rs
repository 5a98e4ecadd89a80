//! Clade and lineage labels derived from the top two levels of a tree.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::domain::tree::TreeNode;

/// Clade labels, shuffled per run and cycled over root children.
pub const CLADE_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Lineage prefixes, used alone as fallback lineages.
pub const LINEAGE_BASES: [&str; 4] = ["L1", "L2", "L3", "L4"];

/// Clade/lineage pair for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CladeAssignment {
    pub clade: String,
    pub lineage: String,
}

/// Sample id to label pair.
pub type CladeMap = BTreeMap<String, CladeAssignment>;

/// Lineage prefix for a clade label (`A` -> `L1`, ...); unknown labels map to `L1`.
pub fn lineage_base(clade: &str) -> &'static str {
    CLADE_LABELS
        .iter()
        .position(|label| *label == clade)
        .map(|idx| LINEAGE_BASES[idx])
        .unwrap_or(LINEAGE_BASES[0])
}

/// Label every leaf by its root-child group (clade) and grandchild subgroup (lineage).
///
/// A root child that is itself a leaf forms its own single subgroup.
/// A single-leaf tree yields an empty map. The label set is shuffled even
/// then, so the rng advances identically for every tree shape.
pub fn assign_clades_and_lineages<R: Rng + ?Sized>(tree: &TreeNode, rng: &mut R) -> CladeMap {
    let mut clade_labels = CLADE_LABELS;
    clade_labels.shuffle(rng);

    let mut mapping = CladeMap::new();
    for (idx, group) in tree.children().iter().enumerate() {
        let clade = clade_labels[idx % clade_labels.len()];
        let base = lineage_base(clade);

        let subgroups = match group.children() {
            [] => std::slice::from_ref(group),
            children => children,
        };

        for (sub_idx, subgroup) in subgroups.iter().enumerate() {
            let lineage = format!("{}.{}", base, sub_idx + 1);
            for leaf in subgroup.leaf_names() {
                trace!(leaf, clade, lineage = %lineage, "label");
                mapping.insert(
                    leaf.to_string(),
                    CladeAssignment {
                        clade: clade.to_string(),
                        lineage: lineage.clone(),
                    },
                );
            }
        }
    }
    debug!(labelled = mapping.len(), "assigned clades");
    mapping
}
