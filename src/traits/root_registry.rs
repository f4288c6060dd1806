use anyhow::Result;
use async_trait::async_trait;

use crate::types::{Digest32, EpochCommitment};

/// Trait for the published-root surface on the destination side.
///
/// One root per epoch, append-only. Publication is an out-of-band admin
/// action; the redemption path only ever reads.
#[async_trait]
pub trait RootRegistry: Send + Sync {
    /// Registry name for logging.
    fn name(&self) -> &'static str;

    /// Publish one epoch commitment. Re-publishing the same epoch with a
    /// different root must be refused.
    async fn publish(&self, commitment: &EpochCommitment) -> Result<()>;

    /// The root published for a given epoch, if any.
    async fn published_root(&self, epoch: u64) -> Result<Option<Digest32>>;

    /// The most recently published root, if any.
    async fn latest_root(&self) -> Result<Option<Digest32>>;
}
