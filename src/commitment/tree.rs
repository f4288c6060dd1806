//! Pure Merkle machinery for epoch commitments.
//!
//! Pairs are hashed in sorted order, so a membership proof carries no
//! left/right bookkeeping: verification re-sorts at every step. An odd
//! layer carries its last node up unchanged.

use anyhow::{bail, Result};
use sha2::{Digest, Sha256};

use crate::keys::canonical_token_ids;
use crate::types::{Digest32, MembershipProof};

/// Hash one burn into a leaf: H( lowercase address || each id as 8-byte BE ).
/// Canonical form, so case and token order never change the digest.
#[inline]
pub fn leaf_hash(address: &str, token_ids: &[u64]) -> Digest32 {
    let ids = canonical_token_ids(token_ids);
    let mut hasher = Sha256::new();
    hasher.update(address.to_ascii_lowercase().as_bytes());
    for id in ids {
        hasher.update(id.to_be_bytes());
    }
    hasher.finalize().into()
}

/// H( min(a,b) || max(a,b) ).
#[inline]
pub fn combine(a: &Digest32, b: &Digest32) -> Digest32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo);
    buf[32..].copy_from_slice(hi);
    let mut hasher = Sha256::new();
    hasher.update(buf);
    hasher.finalize().into()
}

/// Fold a sibling path from the leaf up and compare against the root.
pub fn verify_membership(root: &Digest32, leaf: &Digest32, siblings: &[Digest32]) -> bool {
    let mut cur = *leaf;
    for sibling in siblings {
        cur = combine(&cur, sibling);
    }
    &cur == root
}

/// All layers of one commitment, leaves first, root layer last.
pub struct CommitmentTree {
    layers: Vec<Vec<Digest32>>,
}

impl CommitmentTree {
    pub fn from_leaves(leaves: Vec<Digest32>) -> Result<Self> {
        if leaves.is_empty() {
            bail!("cannot build a commitment over zero leaves");
        }

        let mut layers = vec![leaves];

        while layers[layers.len() - 1].len() > 1 {
            let current_level = &layers[layers.len() - 1];
            let mut next_level = Vec::with_capacity(current_level.len().div_ceil(2));

            for chunk in current_level.chunks(2) {
                let node = if chunk.len() == 2 {
                    combine(&chunk[0], &chunk[1])
                } else {
                    // odd node promoted, never self-paired
                    chunk[0]
                };
                next_level.push(node);
            }

            layers.push(next_level);
        }

        Ok(Self { layers })
    }

    pub fn root(&self) -> Digest32 {
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Sibling path for one leaf, ordered leaf-to-root. Promoted nodes
    /// contribute no sibling at their layer.
    pub fn proof_for(&self, index: usize) -> Result<MembershipProof> {
        if index >= self.leaf_count() {
            bail!(
                "leaf index {index} out of bounds for {} leaves",
                self.leaf_count()
            );
        }

        let mut siblings = Vec::new();
        let mut current_index = index;

        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling_index = if current_index % 2 == 0 {
                current_index + 1
            } else {
                current_index - 1
            };

            if sibling_index < layer.len() {
                siblings.push(layer[sibling_index]);
            }

            current_index /= 2;
        }

        Ok(MembershipProof {
            leaf: self.layers[0][index],
            siblings,
        })
    }
}
