//! The redemption state machine.
//!
//! One `redeem` call takes a claim from `Pending` to a terminal
//! `Confirmed` or `Failed`, with every domain outcome expressed as a
//! reason code on the claim. `Err` is reserved for internal invariant
//! failures (a store that cannot be read at all), never for a holder
//! doing something wrong.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::gateway::{ClaimGatewayVariant, GatewayError};
use crate::keys::{canonical_token_ids, normalize_address, ProofKey};
use crate::proofs::{LookupResult, ProofStore};
use crate::redemption::ledger::BurnLedger;
use crate::traits::ClaimGateway;
use crate::types::{ClaimStatus, FailReason, MembershipProof, RedemptionClaim};

/// Per-key async mutex registry. Concurrent redemptions of the same
/// canonical identity serialize; different identities never contend.
struct KeyedLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.inner.lock().await;
            registry
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub struct RedemptionCoordinator {
    ledger: Arc<BurnLedger>,
    proofs: Arc<ProofStore>,
    gateway: Arc<ClaimGatewayVariant>,
    redemption_rate: usize,
    claim_timeout: Duration,
    locks: KeyedLocks,
}

impl RedemptionCoordinator {
    pub fn new(
        ledger: Arc<BurnLedger>,
        proofs: Arc<ProofStore>,
        gateway: Arc<ClaimGatewayVariant>,
        redemption_rate: usize,
        claim_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            proofs,
            gateway,
            redemption_rate,
            claim_timeout,
            locks: KeyedLocks::new(),
        }
    }

    /// Run one redemption attempt end to end.
    pub async fn redeem(
        &self,
        address: &str,
        token_ids: &[u64],
        source_tx_hash: &str,
    ) -> Result<RedemptionClaim> {
        let id = Uuid::new_v4();
        let ids = canonical_token_ids(token_ids);

        // preconditions, before any I/O
        let holder = match normalize_address(address) {
            Ok(holder) => holder,
            Err(_) => {
                return Ok(failed_claim(
                    id,
                    address,
                    &ids,
                    source_tx_hash,
                    FailReason::MalformedAddress(address.to_string()),
                ));
            }
        };
        if ids.len() != self.redemption_rate {
            return Ok(failed_claim(
                id,
                &holder,
                &ids,
                source_tx_hash,
                FailReason::WrongTokenCount {
                    expected: self.redemption_rate,
                    got: ids.len(),
                },
            ));
        }

        // same-identity attempts serialize here
        let identity = ProofKey::new(&holder, &ids, None)?;
        let _guard = self.locks.acquire(&identity.to_string()).await;
        debug!(claim = %id, key = %identity, "redemption lock acquired");

        // double-redemption guard, no chain call past this point if it trips
        let record = match self.ledger.find(&holder, &ids).await? {
            None => {
                return Ok(failed_claim(
                    id,
                    &holder,
                    &ids,
                    source_tx_hash,
                    FailReason::NoSuchBurn,
                ));
            }
            Some(record) if record.redeemed => {
                info!(claim = %id, key = %identity, "redemption refused: already redeemed");
                return Ok(failed_claim(
                    id,
                    &holder,
                    &ids,
                    source_tx_hash,
                    FailReason::AlreadyRedeemed,
                ));
            }
            Some(record) => record,
        };

        // proof resolution
        let proof = match self.proofs.lookup(&holder, &ids, Some(source_tx_hash)).await {
            LookupResult::Found { proof, via } => {
                debug!(claim = %id, via = ?via, "proof resolved");
                match proof.membership_proof() {
                    Some(proof) => proof,
                    None => {
                        return Ok(failed_claim(
                            id,
                            &holder,
                            &ids,
                            source_tx_hash,
                            FailReason::StoreCorrupted,
                        ));
                    }
                }
            }
            LookupResult::NotFound { corrupt_entries } => {
                let reason = if corrupt_entries > 0 {
                    warn!(
                        claim = %id,
                        corrupt_entries,
                        "proof lookup hit corrupt entries, repair advised"
                    );
                    FailReason::StoreCorrupted
                } else {
                    FailReason::ProofMissing
                };
                return Ok(failed_claim(id, &holder, &ids, source_tx_hash, reason));
            }
        };

        // chain submission, bounded by the claim timeout
        let receipt = match self.submit(&holder, &ids, &proof).await {
            Ok(receipt) => receipt,
            Err(reason) => {
                warn!(claim = %id, key = %identity, reason = %reason, "claim failed");
                return Ok(failed_claim(id, &holder, &ids, source_tx_hash, reason));
            }
        };

        // confirmation: flip the local flag, attach the destination tx
        self.ledger
            .mark_redeemed(&holder, &ids, &receipt.tx_hash)
            .await?;
        info!(
            claim = %id,
            key = %identity,
            destination_tx = %receipt.tx_hash,
            "redemption confirmed"
        );

        Ok(RedemptionClaim {
            id,
            holder_address: record.holder_address,
            token_ids: record.token_ids,
            source_tx_hash: source_tx_hash.to_ascii_lowercase(),
            destination_tx_hash: Some(receipt.tx_hash),
            status: ClaimStatus::Confirmed,
        })
    }

    async fn submit(
        &self,
        holder: &str,
        ids: &[u64],
        proof: &MembershipProof,
    ) -> std::result::Result<crate::types::ClaimReceipt, FailReason> {
        let submission = self.gateway.submit_claim(holder, ids, proof);
        match tokio::time::timeout(self.claim_timeout, submission).await {
            Err(_) => Err(FailReason::SubmitTimeout),
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(err)) => match err.downcast_ref::<GatewayError>() {
                Some(GatewayError::Rejected(reason)) => {
                    Err(FailReason::ChainRejected(reason.clone()))
                }
                Some(GatewayError::Timeout) | Some(GatewayError::Transport(_)) => {
                    // transient: a later attempt may go through
                    Err(FailReason::SubmitTimeout)
                }
                None => Err(FailReason::ChainRejected(err.to_string())),
            },
        }
    }
}

fn failed_claim(
    id: Uuid,
    holder_address: &str,
    token_ids: &[u64],
    source_tx_hash: &str,
    reason: FailReason,
) -> RedemptionClaim {
    RedemptionClaim {
        id,
        holder_address: holder_address.to_string(),
        token_ids: token_ids.to_vec(),
        source_tx_hash: source_tx_hash.to_ascii_lowercase(),
        destination_tx_hash: None,
        status: ClaimStatus::Failed(reason),
    }
}
