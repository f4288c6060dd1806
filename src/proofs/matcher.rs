//! Approximate key matching for the proof read path.
//!
//! Storage-time keys drift: mixed-case addresses, reordered token ids,
//! missing segments. `parse_key` salvages whatever a stored key still
//! carries; `overlap` scores a candidate against the query; `MatchPolicy`
//! decides whether the best candidate is good enough.

use std::collections::HashSet;

use tracing::warn;

use crate::keys::{canonical_token_ids, is_address, is_tx_hash, ProofKey};

pub const DEFAULT_SAME_ADDRESS_OVERLAP: f64 = 0.90;
pub const DEFAULT_CROSS_ADDRESS_OVERLAP: f64 = 0.95;

/// Whatever a stored key could be attributed to. Unknown segments are
/// tolerated and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub address: Option<String>,
    pub token_ids: Vec<u64>,
    pub tx_hash: Option<String>,
}

impl ParsedKey {
    /// The canonical key this entry should have been stored under, if it
    /// carries enough to be attributable at all.
    pub fn canonical(&self) -> Option<ProofKey> {
        let address = self.address.as_deref()?;
        ProofKey::new(address, &self.token_ids, self.tx_hash.as_deref()).ok()
    }
}

/// Tolerant parse: optional address segment (any case, any position,
/// first wins), numeric token ids, optional transaction hash. `None` when
/// nothing attributable remains.
pub fn parse_key(raw: &str) -> Option<ParsedKey> {
    let mut address = None;
    let mut token_ids = Vec::new();
    let mut tx_hash = None;

    for part in raw.split('_').filter(|p| !p.is_empty()) {
        if address.is_none() && is_address(part) {
            address = Some(part.to_ascii_lowercase());
        } else if tx_hash.is_none() && is_tx_hash(part) {
            tx_hash = Some(part.to_ascii_lowercase());
        } else if let Ok(id) = part.parse::<u64>() {
            token_ids.push(id);
        }
    }

    if address.is_none() && token_ids.is_empty() {
        return None;
    }
    Some(ParsedKey {
        address,
        token_ids: canonical_token_ids(&token_ids),
        tx_hash,
    })
}

/// |query ∩ stored| / max(|query|, |stored|). The max denominator keeps a
/// superset key from scoring a full match.
pub fn overlap(query: &[u64], stored: &[u64]) -> f64 {
    if query.is_empty() || stored.is_empty() {
        return 0.0;
    }
    let q: HashSet<u64> = query.iter().copied().collect();
    let s: HashSet<u64> = stored.iter().copied().collect();
    let shared = q.intersection(&s).count();
    shared as f64 / q.len().max(s.len()) as f64
}

/// Acceptance thresholds for approximate matches. Policy, not constants:
/// loosening them trades recall for a weaker at-most-once story, so
/// construction warns when configured below the defaults.
#[derive(Debug, Clone, Copy)]
pub struct MatchPolicy {
    pub same_address_overlap: f64,
    pub cross_address_overlap: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            same_address_overlap: DEFAULT_SAME_ADDRESS_OVERLAP,
            cross_address_overlap: DEFAULT_CROSS_ADDRESS_OVERLAP,
        }
    }
}

impl MatchPolicy {
    pub fn new(same_address_overlap: f64, cross_address_overlap: f64) -> Self {
        if same_address_overlap < DEFAULT_SAME_ADDRESS_OVERLAP
            || cross_address_overlap < DEFAULT_CROSS_ADDRESS_OVERLAP
        {
            warn!(
                same_address_overlap,
                cross_address_overlap,
                "match thresholds loosened below defaults; approximate lookups will accept weaker evidence"
            );
        }
        Self {
            same_address_overlap,
            cross_address_overlap,
        }
    }

    pub fn accepts(&self, address_matched: bool, score: f64) -> bool {
        (address_matched && score >= self.same_address_overlap)
            || score >= self.cross_address_overlap
    }
}
