//! Append-only burn ledger over the durable store.
//!
//! The ledger is the local source of truth for which burns exist and
//! which are redeemed. Records live under their own prefix, outside any
//! cache namespace, so cache eviction can never touch them.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::durable::DurableStoreVariant;
use crate::keys::ProofKey;
use crate::traits::DurableStore;
use crate::types::{now_secs, BurnRecord, ObservedBurn};

pub const BURN_PREFIX: &str = "burn/";

pub struct BurnLedger {
    store: Arc<DurableStoreVariant>,
}

impl BurnLedger {
    pub fn new(store: Arc<DurableStoreVariant>) -> Self {
        Self { store }
    }

    fn storage_key(key: &ProofKey) -> String {
        format!("{BURN_PREFIX}{key}")
    }

    /// Canonicalize and append one observation. Re-observing a burn that
    /// is already recorded is a no-op returning the existing record.
    pub async fn record(&self, observed: &ObservedBurn) -> Result<BurnRecord> {
        let key = ProofKey::new(&observed.holder_address, &observed.token_ids, None)
            .context("burn observation rejected")?;

        if let Some(existing) = self.find(key.address(), key.token_ids()).await? {
            debug!(key = %key, "burn already recorded");
            return Ok(existing);
        }

        let record = BurnRecord {
            holder_address: key.address().to_string(),
            token_ids: key.token_ids().to_vec(),
            source_tx_hash: observed.source_tx_hash.to_ascii_lowercase(),
            timestamp: now_secs(),
            redeemed: false,
        };
        self.store
            .put(&Self::storage_key(&key), &serde_json::to_string(&record)?)
            .await?;
        info!(key = %key, block = observed.block_number, "burn recorded");
        Ok(record)
    }

    /// The record for a canonical `(address, token set)` identity, if any.
    /// A malformed query can match nothing, so it is a clean miss.
    pub async fn find(&self, address: &str, token_ids: &[u64]) -> Result<Option<BurnRecord>> {
        let Ok(key) = ProofKey::new(address, token_ids, None) else {
            return Ok(None);
        };
        match self.store.get(&Self::storage_key(&key)).await? {
            Some(raw) => Ok(Some(
                serde_json::from_str(&raw).context("corrupt burn record")?,
            )),
            None => Ok(None),
        }
    }

    /// Flip the `redeemed` flag. The destination transaction is recorded
    /// in the audit log; the claim carries it for the caller.
    pub async fn mark_redeemed(
        &self,
        address: &str,
        token_ids: &[u64],
        destination_tx: &str,
    ) -> Result<()> {
        let key = ProofKey::new(address, token_ids, None)?;
        let storage_key = Self::storage_key(&key);

        let raw = self
            .store
            .get(&storage_key)
            .await?
            .context("no burn record to mark redeemed")?;
        let mut record: BurnRecord = serde_json::from_str(&raw).context("corrupt burn record")?;
        record.redeemed = true;

        self.store
            .put(&storage_key, &serde_json::to_string(&record)?)
            .await?;
        info!(key = %key, destination_tx, "burn marked redeemed");
        Ok(())
    }

    /// Every recorded burn, the epoch build input. A record that no
    /// longer parses is logged and skipped rather than blocking the
    /// whole epoch.
    pub async fn all(&self) -> Result<Vec<BurnRecord>> {
        let entries = self.store.scan_prefix(BURN_PREFIX).await?;
        let mut records = Vec::with_capacity(entries.len());
        for (storage_key, raw) in entries {
            match serde_json::from_str::<BurnRecord>(&raw) {
                Ok(record) => records.push(record),
                Err(e) => warn!(key = %storage_key, error = %e, "skipping corrupt burn record"),
            }
        }
        Ok(records)
    }

    pub async fn len(&self) -> Result<usize> {
        Ok(self.store.scan_prefix(BURN_PREFIX).await?.len())
    }
}
