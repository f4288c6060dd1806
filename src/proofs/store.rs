//! Proof persistence and lookup over the tiered cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::TieredCache;
use crate::keys::{canonical_token_ids, normalize_address, ProofKey};
use crate::proofs::matcher::{overlap, parse_key, MatchPolicy};
use crate::types::{now_secs, to_0x_hex, Digest32, MembershipProof, StoredProof};

/// How a lookup found its proof.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchVia {
    /// A literal canonical-key probe hit.
    Literal { key: String },
    /// The flexible scan accepted the best-scoring stored key.
    Flexible {
        key: String,
        score: f64,
        address_matched: bool,
    },
}

/// Outcome of a proof lookup. Never an error: a missing proof is a
/// result, not an exception, and the coordinator decides what it means.
#[derive(Debug, Clone)]
pub enum LookupResult {
    Found {
        proof: StoredProof,
        via: MatchVia,
    },
    /// No acceptable proof. `corrupt_entries` counts unusable entries the
    /// scan ran into, so the caller can tell "nothing stored" from "the
    /// store needs repair".
    NotFound { corrupt_entries: usize },
}

pub struct ProofStore {
    pub(crate) cache: Arc<TieredCache>,
    pub(crate) policy: MatchPolicy,
    pub(crate) proof_ttl: Duration,
}

impl ProofStore {
    pub fn new(cache: Arc<TieredCache>, policy: MatchPolicy, proof_ttl: Duration) -> Self {
        Self {
            cache,
            policy,
            proof_ttl,
        }
    }

    /// Persist one epoch's proofs, each under its canonical key, with the
    /// store's very-long TTL.
    pub async fn store_batch(
        &self,
        root: &Digest32,
        proofs_by_key: &HashMap<String, MembershipProof>,
    ) {
        let generated_at = now_secs();
        let root_hex = to_0x_hex(root);

        for (key, proof) in proofs_by_key {
            let stored = StoredProof {
                key: key.clone(),
                root: root_hex.clone(),
                leaf: to_0x_hex(&proof.leaf),
                siblings: proof.siblings.iter().map(|s| to_0x_hex(s)).collect(),
                generated_at,
            };
            self.cache.set(key, &stored, self.proof_ttl, true).await;
        }

        info!(
            root = %root_hex,
            proofs = proofs_by_key.len(),
            "stored epoch proof batch"
        );
    }

    /// Resolve a proof for a claim. Literal canonical probes first, in
    /// priority order, then the flexible scan.
    pub async fn lookup(
        &self,
        address: &str,
        token_ids: &[u64],
        tx_hash: Option<&str>,
    ) -> LookupResult {
        let query_address = normalize_address(address).ok();
        let query_ids = canonical_token_ids(token_ids);
        let mut corrupt_entries = 0usize;

        for probe in self.literal_probes(query_address.as_deref(), &query_ids, tx_hash) {
            match self.cache.get::<StoredProof>(&probe).await {
                Some(stored) if stored.membership_proof().is_some() => {
                    debug!(key = %probe, "literal proof hit");
                    return LookupResult::Found {
                        proof: stored,
                        via: MatchVia::Literal { key: probe },
                    };
                }
                Some(_) => {
                    // key exists but the payload is not a usable proof
                    corrupt_entries += 1;
                }
                None => {}
            }
        }

        self.flexible_lookup(query_address.as_deref(), &query_ids, corrupt_entries)
            .await
    }

    /// Post-redemption cleanup. Optional: correctness rests on the ledger
    /// flag and the destination contract, not on proof removal.
    pub async fn remove(&self, key: &str) {
        self.cache.remove(key).await;
    }

    fn literal_probes(
        &self,
        address: Option<&str>,
        token_ids: &[u64],
        tx_hash: Option<&str>,
    ) -> Vec<String> {
        let mut probes = Vec::with_capacity(3);

        if let Some(key) = address.and_then(|addr| ProofKey::new(addr, token_ids, None).ok()) {
            if let Some(enriched) = tx_hash.and_then(|tx| key.with_tx(tx)) {
                probes.push(enriched.to_string());
            }
            probes.push(key.to_string());
        }
        if !token_ids.is_empty() {
            let joined_ids = token_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join("_");
            probes.push(joined_ids);
        }
        probes
    }

    async fn flexible_lookup(
        &self,
        query_address: Option<&str>,
        query_ids: &[u64],
        mut corrupt_entries: usize,
    ) -> LookupResult {
        let mut best: Option<(f64, bool, String)> = None;

        for key in self.cache.live_keys().await {
            let Some(parsed) = parse_key(&key) else {
                corrupt_entries += 1;
                continue;
            };
            if parsed.token_ids.is_empty() {
                corrupt_entries += 1;
                continue;
            }

            let score = overlap(query_ids, &parsed.token_ids);
            let address_matched = match (query_address, parsed.address.as_deref()) {
                (Some(q), Some(s)) => q == s,
                _ => false,
            };
            if !self.policy.accepts(address_matched, score) {
                continue;
            }

            let better = match &best {
                None => true,
                Some((best_score, best_addr, best_key)) => {
                    score > *best_score
                        || (score == *best_score && address_matched && !*best_addr)
                        || (score == *best_score && address_matched == *best_addr && key < *best_key)
                }
            };
            if better {
                best = Some((score, address_matched, key));
            }
        }

        let Some((score, address_matched, key)) = best else {
            return LookupResult::NotFound { corrupt_entries };
        };

        match self.cache.get::<StoredProof>(&key).await {
            Some(stored) if stored.membership_proof().is_some() => {
                debug!(key = %key, score, address_matched, "flexible proof hit");
                LookupResult::Found {
                    proof: stored,
                    via: MatchVia::Flexible {
                        key,
                        score,
                        address_matched,
                    },
                }
            }
            _ => {
                // best candidate's payload is unusable
                corrupt_entries += 1;
                LookupResult::NotFound { corrupt_entries }
            }
        }
    }
}
