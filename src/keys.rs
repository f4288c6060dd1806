//! Canonical proof keys.
//!
//! Every stored proof, ledger entry, and redemption lock is addressed by one
//! deterministic string form of a burn's identity:
//!
//! `"<lowercase address>_<sorted token ids joined by '_'>[_<lowercase tx hash>]"`
//!
//! Canonical keys round-trip: parsing a canonical key and re-serializing it
//! yields the identical string.

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// `0x` + 40 hex digits, any case.
pub fn is_address(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(raw) => raw.len() == 40 && raw.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// `0x` + 64 hex digits, any case.
pub fn is_tx_hash(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(raw) => raw.len() == 64 && raw.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Lowercase a holder address, rejecting anything that is not
/// `0x` + 40 hex digits.
pub fn normalize_address(s: &str) -> Result<String> {
    let trimmed = s.trim();
    if !is_address(trimmed) {
        bail!("malformed address: {trimmed:?}");
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Lowercase a transaction hash if it is well-formed.
pub fn normalize_tx_hash(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if is_tx_hash(trimmed) {
        Some(trimmed.to_ascii_lowercase())
    } else {
        None
    }
}

/// Numerically sort and deduplicate a token id set.
pub fn canonical_token_ids(ids: &[u64]) -> Vec<u64> {
    let mut out = ids.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}

/// Canonical identity of one burn: address + sorted token ids, with an
/// optional transaction-hash enrichment added at the proof-store layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofKey {
    address: String,
    token_ids: Vec<u64>,
    tx_hash: Option<String>,
}

impl ProofKey {
    /// Build a canonical key, normalizing all parts. Fails on a malformed
    /// address, an empty token set, or a malformed transaction hash.
    pub fn new(address: &str, token_ids: &[u64], tx_hash: Option<&str>) -> Result<Self> {
        let address = normalize_address(address)?;
        let token_ids = canonical_token_ids(token_ids);
        if token_ids.is_empty() {
            bail!("proof key requires at least one token id");
        }
        let tx_hash = match tx_hash {
            Some(raw) => match normalize_tx_hash(raw) {
                Some(tx) => Some(tx),
                None => bail!("malformed transaction hash: {raw:?}"),
            },
            None => None,
        };
        Ok(Self {
            address,
            token_ids,
            tx_hash,
        })
    }

    /// Parse a canonical key string. Mixed-case parts are normalized, so
    /// round-tripping is the identity exactly on canonical inputs.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('_').collect();
        if parts.len() < 2 || !is_address(parts[0]) {
            return None;
        }
        let address = parts[0].to_ascii_lowercase();

        let (id_parts, tx_hash) = match parts.last() {
            Some(last) if is_tx_hash(last) => {
                (&parts[1..parts.len() - 1], Some(last.to_ascii_lowercase()))
            }
            _ => (&parts[1..], None),
        };
        if id_parts.is_empty() {
            return None;
        }

        let mut token_ids = Vec::with_capacity(id_parts.len());
        for part in id_parts {
            token_ids.push(part.parse::<u64>().ok()?);
        }

        Some(Self {
            address,
            token_ids: canonical_token_ids(&token_ids),
            tx_hash,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn token_ids(&self) -> &[u64] {
        &self.token_ids
    }

    pub fn tx_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref()
    }

    /// The same key with the transaction enrichment stripped — the form the
    /// commitment builder keys proofs by.
    pub fn without_tx(&self) -> Self {
        Self {
            address: self.address.clone(),
            token_ids: self.token_ids.clone(),
            tx_hash: None,
        }
    }

    /// The same key enriched with a transaction hash.
    pub fn with_tx(&self, tx_hash: &str) -> Option<Self> {
        Some(Self {
            address: self.address.clone(),
            token_ids: self.token_ids.clone(),
            tx_hash: Some(normalize_tx_hash(tx_hash)?),
        })
    }
}

impl fmt::Display for ProofKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        for id in &self.token_ids {
            write!(f, "_{id}")?;
        }
        if let Some(tx) = &self.tx_hash {
            write!(f, "_{tx}")?;
        }
        Ok(())
    }
}
