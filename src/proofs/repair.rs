//! Operational diagnosis and repair of the proof store.
//!
//! `diagnose` reads and reports; `repair` rewrites. Both walk the same
//! live-key view the lookup scan uses, so what they report is what the
//! redemption path would hit.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::proofs::matcher::parse_key;
use crate::proofs::store::ProofStore;
use crate::types::StoredProof;

/// Entries examined per `diagnose` run. A sample keeps the report cheap on
/// large stores; `repair` always walks everything.
const DIAGNOSE_SAMPLE: usize = 64;

/// What `diagnose` saw. Read-only; nothing was mutated to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisReport {
    /// Live entries in the store.
    pub total_entries: usize,
    /// How many of them were examined.
    pub sampled: usize,
    /// Sampled keys that parse to a valid address and at least one token id.
    pub attributable_keys: usize,
    /// Sampled payloads that decode into a well-formed hash list.
    pub well_formed_proofs: usize,
    /// Sampled entries failing either check.
    pub corrupt_entries: usize,
}

impl DiagnosisReport {
    pub fn any_proofs(&self) -> bool {
        self.total_entries > 0
    }

    pub fn healthy(&self) -> bool {
        self.corrupt_entries == 0
    }
}

impl ProofStore {
    /// Sample stored entries and report their condition.
    pub async fn diagnose(&self) -> DiagnosisReport {
        let keys = self.cache.live_keys().await;
        let total_entries = keys.len();

        let mut attributable_keys = 0;
        let mut well_formed_proofs = 0;
        let mut corrupt_entries = 0;
        let mut sampled = 0;

        for key in keys.into_iter().take(DIAGNOSE_SAMPLE) {
            sampled += 1;

            let attributable = parse_key(&key)
                .and_then(|parsed| parsed.canonical())
                .is_some();
            if attributable {
                attributable_keys += 1;
            }

            let well_formed = match self.cache.get_value(&key).await {
                Some(value) => serde_json::from_value::<StoredProof>(value)
                    .ok()
                    .and_then(|stored| stored.membership_proof())
                    .is_some(),
                None => false,
            };
            if well_formed {
                well_formed_proofs += 1;
            }

            if !attributable || !well_formed {
                corrupt_entries += 1;
            }
        }

        let report = DiagnosisReport {
            total_entries,
            sampled,
            attributable_keys,
            well_formed_proofs,
            corrupt_entries,
        };
        info!(
            total = report.total_entries,
            sampled = report.sampled,
            corrupt = report.corrupt_entries,
            "proof store diagnosis"
        );
        report
    }

    /// Re-key every stored entry into canonical form and discard what
    /// cannot be salvaged. Returns the number of entries changed (rewritten
    /// or discarded); a second consecutive run returns 0.
    pub async fn repair(&self) -> usize {
        let keys = self.cache.live_keys().await;
        let mut changed = 0usize;
        let mut rewritten: HashSet<String> = HashSet::new();

        for key in keys {
            let canonical = parse_key(&key).and_then(|parsed| parsed.canonical());
            let Some(canonical) = canonical else {
                // not attributable to an address plus token ids
                warn!(key = %key, "discarding unattributable proof entry");
                self.cache.remove(&key).await;
                changed += 1;
                continue;
            };

            let stored = match self.cache.get_value(&key).await {
                Some(value) => serde_json::from_value::<StoredProof>(value).ok(),
                None => None,
            };
            let Some(mut stored) = stored.filter(|s| s.membership_proof().is_some()) else {
                // unusable payload; drop it so a later epoch re-store
                // lands cleanly
                warn!(key = %key, "discarding unreadable proof payload");
                self.cache.remove(&key).await;
                changed += 1;
                continue;
            };

            let canonical_key = canonical.to_string();
            if canonical_key == key {
                continue;
            }

            // drifted key: move the entry to its canonical slot unless a
            // canonical entry already exists
            let occupied = rewritten.contains(&canonical_key)
                || self
                    .cache
                    .get::<StoredProof>(&canonical_key)
                    .await
                    .and_then(|s| s.membership_proof())
                    .is_some();
            if !occupied {
                stored.key = canonical_key.clone();
                self.cache
                    .set(&canonical_key, &stored, self.proof_ttl, true)
                    .await;
                rewritten.insert(canonical_key);
            }
            self.cache.remove(&key).await;
            changed += 1;
        }

        info!(changed, "proof store repair finished");
        changed
    }
}
