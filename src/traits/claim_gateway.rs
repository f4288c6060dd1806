use anyhow::Result;
use async_trait::async_trait;

use crate::types::{ClaimReceipt, MembershipProof};

/// Trait for destination-chain claim submission.
///
/// Implementations wrap whatever actually reaches the chain (a signed
/// contract call, an HTTP relay, a simulation). Failures should carry a
/// `GatewayError` so the coordinator can map them to a reason code.
#[async_trait]
pub trait ClaimGateway: Send + Sync {
    /// Gateway name for logging.
    fn name(&self) -> &'static str;

    /// Submit one claim with its membership proof. A receipt means the
    /// destination chain accepted the claim.
    async fn submit_claim(
        &self,
        holder_address: &str,
        token_ids: &[u64],
        proof: &MembershipProof,
    ) -> Result<ClaimReceipt>;
}
