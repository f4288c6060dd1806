use anyhow::Result;
use async_trait::async_trait;

use crate::traits::{ClaimGateway, RootRegistry};
use crate::types::{ClaimReceipt, Digest32, EpochCommitment, MembershipProof};

/// Noop claim gateway for demonstration purposes: accepts everything and
/// synthesizes a receipt.
pub struct NoopClaimGateway;

#[async_trait]
impl ClaimGateway for NoopClaimGateway {
    fn name(&self) -> &'static str {
        "noop-gateway"
    }

    async fn submit_claim(
        &self,
        holder_address: &str,
        token_ids: &[u64],
        _proof: &MembershipProof,
    ) -> Result<ClaimReceipt> {
        tracing::info!(
            holder = holder_address,
            tokens = token_ids.len(),
            "NoopClaimGateway: claim accepted without submission"
        );
        Ok(ClaimReceipt {
            tx_hash: format!("0x{:064x}", 0),
            block_number: None,
        })
    }
}

/// Noop root registry for demonstration purposes.
pub struct NoopRootRegistry;

#[async_trait]
impl RootRegistry for NoopRootRegistry {
    fn name(&self) -> &'static str {
        "noop-registry"
    }

    async fn publish(&self, commitment: &EpochCommitment) -> Result<()> {
        tracing::info!(
            epoch = commitment.epoch,
            "NoopRootRegistry: publish() called - root discarded"
        );
        Ok(())
    }

    async fn published_root(&self, _epoch: u64) -> Result<Option<Digest32>> {
        Ok(None)
    }

    async fn latest_root(&self) -> Result<Option<Digest32>> {
        Ok(None)
    }
}
