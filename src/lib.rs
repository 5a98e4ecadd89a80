//! Synthetic phylogenetic demo data: a random binary tree over sample ids
//! (Newick) and a matching per-sample metadata table (CSV).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
