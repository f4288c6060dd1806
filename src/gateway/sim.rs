//! In-process destination chain for tests and local runs.
//!
//! One shared state implements both seams, so publishing a root and
//! claiming against it hit the same simulated chain. The simulation
//! enforces what the real destination contract enforces: roots are
//! append-only per epoch, proofs must verify, and a leaf claims once.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::commitment::{leaf_hash, verify_membership};
use crate::gateway::error::GatewayError;
use crate::traits::{ClaimGateway, RootRegistry};
use crate::types::{to_0x_hex, ClaimReceipt, Digest32, EpochCommitment, MembershipProof};

#[derive(Default)]
struct SimState {
    roots: HashMap<u64, Digest32>,
    latest_epoch: Option<u64>,
    used_leaves: HashSet<Digest32>,
    block_height: u64,
}

/// Cloneable handle onto one simulated destination chain.
#[derive(Clone, Default)]
pub struct SimulatedChain {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accepted claims so far.
    pub fn claims_accepted(&self) -> usize {
        self.state.lock().unwrap().used_leaves.len()
    }
}

#[async_trait]
impl RootRegistry for SimulatedChain {
    fn name(&self) -> &'static str {
        "sim-chain"
    }

    async fn publish(&self, commitment: &EpochCommitment) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.roots.get(&commitment.epoch) {
            if existing != &commitment.root {
                return Err(GatewayError::Rejected(format!(
                    "epoch {} already has a different root",
                    commitment.epoch
                ))
                .into());
            }
            // same root again is a harmless republish
            return Ok(());
        }
        state.roots.insert(commitment.epoch, commitment.root);
        if state.latest_epoch.map_or(true, |e| commitment.epoch > e) {
            state.latest_epoch = Some(commitment.epoch);
        }
        info!(
            epoch = commitment.epoch,
            root = %to_0x_hex(&commitment.root),
            leaves = commitment.leaf_count,
            "root published to simulated chain"
        );
        Ok(())
    }

    async fn published_root(&self, epoch: u64) -> Result<Option<Digest32>> {
        Ok(self.state.lock().unwrap().roots.get(&epoch).copied())
    }

    async fn latest_root(&self) -> Result<Option<Digest32>> {
        let state = self.state.lock().unwrap();
        Ok(state.latest_epoch.and_then(|e| state.roots.get(&e).copied()))
    }
}

#[async_trait]
impl ClaimGateway for SimulatedChain {
    fn name(&self) -> &'static str {
        "sim-chain"
    }

    async fn submit_claim(
        &self,
        holder_address: &str,
        token_ids: &[u64],
        proof: &MembershipProof,
    ) -> Result<ClaimReceipt> {
        let mut state = self.state.lock().unwrap();

        let root = state
            .latest_epoch
            .and_then(|e| state.roots.get(&e).copied())
            .ok_or_else(|| GatewayError::Rejected("no root published".to_string()))?;

        // the contract recomputes the leaf from the claim itself
        let leaf = leaf_hash(holder_address, token_ids);
        if leaf != proof.leaf {
            return Err(
                GatewayError::Rejected("proof leaf does not match claim".to_string()).into(),
            );
        }
        if !verify_membership(&root, &leaf, &proof.siblings) {
            return Err(GatewayError::Rejected("proof does not verify".to_string()).into());
        }
        if state.used_leaves.contains(&leaf) {
            return Err(GatewayError::Rejected("leaf already claimed".to_string()).into());
        }

        state.used_leaves.insert(leaf);
        state.block_height += 1;
        let block = state.block_height;

        let mut hasher = Sha256::new();
        hasher.update(leaf);
        hasher.update(block.to_be_bytes());
        let tx: Digest32 = hasher.finalize().into();

        Ok(ClaimReceipt {
            tx_hash: to_0x_hex(&tx),
            block_number: Some(block),
        })
    }
}
