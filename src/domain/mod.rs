//! Domain layer: tree generation, labelling and metadata records
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! All randomness comes from an rng passed in by the caller.

pub mod error;
pub mod labels;
pub mod metadata;
pub mod newick;
pub mod tree;

pub use error::DomainError;
pub use labels::{assign_clades_and_lineages, CladeAssignment, CladeMap};
pub use metadata::{generate_metadata, sample_ids, MetadataRecord, METADATA_COLUMNS};
pub use newick::{format_length, to_newick, to_newick_document};
pub use tree::{build_random_tree, make_ultrametric, NodeKind, TreeNode};

/// Smallest sample count that yields a tree with internal structure.
pub const MIN_SAMPLES: usize = 2;

/// Reject sample counts below `MIN_SAMPLES`, negative ones included.
pub fn validate_sample_count(requested: i64) -> Result<usize, DomainError> {
    usize::try_from(requested)
        .ok()
        .filter(|&count| count >= MIN_SAMPLES)
        .ok_or(DomainError::TooFewSamples {
            requested,
            minimum: MIN_SAMPLES,
        })
}
