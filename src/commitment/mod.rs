pub mod builder;
pub mod tree;

pub use builder::{build, CommitmentBatch};
pub use tree::{combine, leaf_hash, verify_membership, CommitmentTree};
