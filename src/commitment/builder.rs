//! Deterministic epoch commitment over a set of burn records.
//!
//! Records are canonicalized, deduplicated by canonical key, and sorted by
//! key before hashing, so any permutation of the same set yields the
//! identical root.

use std::collections::HashMap;

use anyhow::{bail, Result};

use crate::commitment::tree::{leaf_hash, CommitmentTree};
use crate::keys::ProofKey;
use crate::types::{BurnRecord, Digest32, MembershipProof};

/// One built epoch: the root, the full tree, and a membership proof per
/// canonical `address_tokens` key. Transaction-hash enrichment happens at
/// the proof store, not here.
pub struct CommitmentBatch {
    pub root: Digest32,
    pub tree: CommitmentTree,
    pub proofs_by_key: HashMap<String, MembershipProof>,
}

pub fn build(records: &[BurnRecord]) -> Result<CommitmentBatch> {
    if records.is_empty() {
        bail!("cannot commit an epoch with zero burn records");
    }

    let mut entries: Vec<(String, ProofKey)> = Vec::with_capacity(records.len());
    for record in records {
        let key = ProofKey::new(&record.holder_address, &record.token_ids, None)?;
        entries.push((key.to_string(), key));
    }

    // duplicate identities collapse to one leaf
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.dedup_by(|a, b| a.0 == b.0);

    let leaves: Vec<Digest32> = entries
        .iter()
        .map(|(_, key)| leaf_hash(key.address(), key.token_ids()))
        .collect();
    let tree = CommitmentTree::from_leaves(leaves)?;

    let mut proofs_by_key = HashMap::with_capacity(entries.len());
    for (index, (rendered, _)) in entries.iter().enumerate() {
        let proof = tree.proof_for(index)?;
        proofs_by_key.insert(rendered.clone(), proof);
    }

    Ok(CommitmentBatch {
        root: tree.root(),
        tree,
        proofs_by_key,
    })
}
