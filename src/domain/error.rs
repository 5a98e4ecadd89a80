//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent generation-rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("--samples must be >= {minimum} (got {requested})")]
    TooFewSamples { requested: i64, minimum: usize },

    #[error("cannot build a tree from an empty sample set")]
    EmptyTree,
}
