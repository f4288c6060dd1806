use anyhow::Result;
use async_trait::async_trait;

use super::{
    http::{HttpClaimGateway, HttpRootRegistry},
    mock::MockClaimGateway,
    noop::{NoopClaimGateway, NoopRootRegistry},
    sim::SimulatedChain,
};
use crate::traits::{ClaimGateway, RootRegistry};
use crate::types::{ClaimReceipt, Digest32, EpochCommitment, MembershipProof};

/// Enum representing all possible claim gateway implementations.
pub enum ClaimGatewayVariant {
    Sim(SimulatedChain),
    Http(HttpClaimGateway),
    Mock(MockClaimGateway),
    Noop(NoopClaimGateway),
}

#[async_trait]
impl ClaimGateway for ClaimGatewayVariant {
    fn name(&self) -> &'static str {
        match self {
            ClaimGatewayVariant::Sim(inner) => inner.name(),
            ClaimGatewayVariant::Http(inner) => inner.name(),
            ClaimGatewayVariant::Mock(inner) => inner.name(),
            ClaimGatewayVariant::Noop(inner) => inner.name(),
        }
    }

    async fn submit_claim(
        &self,
        holder_address: &str,
        token_ids: &[u64],
        proof: &MembershipProof,
    ) -> Result<ClaimReceipt> {
        match self {
            ClaimGatewayVariant::Sim(inner) => {
                inner.submit_claim(holder_address, token_ids, proof).await
            }
            ClaimGatewayVariant::Http(inner) => {
                inner.submit_claim(holder_address, token_ids, proof).await
            }
            ClaimGatewayVariant::Mock(inner) => {
                inner.submit_claim(holder_address, token_ids, proof).await
            }
            ClaimGatewayVariant::Noop(inner) => {
                inner.submit_claim(holder_address, token_ids, proof).await
            }
        }
    }
}

/// Enum representing all possible root registry implementations.
pub enum RootRegistryVariant {
    Sim(SimulatedChain),
    Http(HttpRootRegistry),
    Noop(NoopRootRegistry),
}

#[async_trait]
impl RootRegistry for RootRegistryVariant {
    fn name(&self) -> &'static str {
        match self {
            RootRegistryVariant::Sim(inner) => inner.name(),
            RootRegistryVariant::Http(inner) => inner.name(),
            RootRegistryVariant::Noop(inner) => inner.name(),
        }
    }

    async fn publish(&self, commitment: &EpochCommitment) -> Result<()> {
        match self {
            RootRegistryVariant::Sim(inner) => inner.publish(commitment).await,
            RootRegistryVariant::Http(inner) => inner.publish(commitment).await,
            RootRegistryVariant::Noop(inner) => inner.publish(commitment).await,
        }
    }

    async fn published_root(&self, epoch: u64) -> Result<Option<Digest32>> {
        match self {
            RootRegistryVariant::Sim(inner) => inner.published_root(epoch).await,
            RootRegistryVariant::Http(inner) => inner.published_root(epoch).await,
            RootRegistryVariant::Noop(inner) => inner.published_root(epoch).await,
        }
    }

    async fn latest_root(&self) -> Result<Option<Digest32>> {
        match self {
            RootRegistryVariant::Sim(inner) => inner.latest_root().await,
            RootRegistryVariant::Http(inner) => inner.latest_root().await,
            RootRegistryVariant::Noop(inner) => inner.latest_root().await,
        }
    }
}
