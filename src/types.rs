use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed-size digest used across the system (SHA-256 output).
pub type Digest32 = [u8; 32];

/// Raw burn observation from the source chain, as reported by the external
/// log scanner. Consumed as-is; this crate never performs the scan itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedBurn {
    /// Holder that sent tokens to the burn address; any hex case accepted.
    pub holder_address: String,
    /// Token ids transferred in the burn transaction; any order accepted.
    pub token_ids: Vec<u64>,
    /// Source-chain transaction hash of the burn.
    pub source_tx_hash: String,
    /// Block in which the burn was observed.
    pub block_number: u64,
}

/// Canonical burn record held in the ledger.
///
/// Created once from an [`ObservedBurn`]; mutated only to flip `redeemed`;
/// never deleted (append-only audit trail).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnRecord {
    /// Lowercased `0x`-prefixed holder address.
    pub holder_address: String,
    /// Numerically sorted, deduplicated token ids.
    pub token_ids: Vec<u64>,
    /// Lowercased source-chain transaction hash.
    pub source_tx_hash: String,
    /// UTC unix timestamp (seconds) of when the burn was recorded.
    pub timestamp: u64,
    /// Set exactly once, by the redemption coordinator.
    pub redeemed: bool,
}

/// Inclusion proof for one canonical record in an epoch commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipProof {
    /// Leaf digest of the canonical `(address, token_ids)` pair.
    pub leaf: Digest32,
    /// Sibling digests, ordered leaf to root. Empty for a single-leaf tree.
    pub siblings: Vec<Digest32>,
}

/// Proof object persisted in the proof store, one per canonical key.
/// Digests are rendered as `0x`-prefixed hex so stored entries stay
/// inspectable by operational tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProof {
    /// Canonical key this proof was stored under.
    pub key: String,
    /// Epoch root the proof verifies against.
    pub root: String,
    /// Leaf digest for the holder's canonical record.
    pub leaf: String,
    /// Sibling hashes, leaf to root.
    pub siblings: Vec<String>,
    /// UTC unix timestamp (seconds) of proof generation.
    pub generated_at: u64,
}

impl StoredProof {
    /// The epoch root as a digest, if the stored hex is intact.
    pub fn root_digest(&self) -> Option<Digest32> {
        digest_from_hex(&self.root)
    }

    /// Decode back into a verifiable proof. `None` when any stored hash
    /// is not a well-formed digest.
    pub fn membership_proof(&self) -> Option<MembershipProof> {
        let leaf = digest_from_hex(&self.leaf)?;
        let mut siblings = Vec::with_capacity(self.siblings.len());
        for raw in &self.siblings {
            siblings.push(digest_from_hex(raw)?);
        }
        Some(MembershipProof { leaf, siblings })
    }
}

/// Commitment published on the destination chain for one epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochCommitment {
    /// Monotonically increasing epoch number.
    pub epoch: u64,
    /// Merkle root over all canonical burn records of the epoch.
    pub root: Digest32,
    /// Number of leaves under the root.
    pub leaf_count: u64,
    /// UTC unix timestamp (seconds) of when the commitment was built.
    pub committed_at: u64,
}

/// Destination-chain acknowledgement of an accepted claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReceipt {
    /// Destination-chain transaction hash.
    pub tx_hash: String,
    /// Block the claim landed in, when the gateway reports it.
    pub block_number: Option<u64>,
}

/// Why a redemption attempt terminated in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// Token count does not equal the configured redemption rate.
    #[error("wrong token count: expected {expected}, got {got}")]
    WrongTokenCount { expected: usize, got: usize },
    /// Holder address is not a `0x` + 40-hex-digit string.
    #[error("malformed holder address: {0}")]
    MalformedAddress(String),
    /// The matching burn record is already redeemed.
    #[error("burn already redeemed")]
    AlreadyRedeemed,
    /// No burn record exists for this (address, token set).
    #[error("no burn record for this address and token set")]
    NoSuchBurn,
    /// A burn record exists but no proof could be resolved.
    #[error("no stored proof matched the claim")]
    ProofMissing,
    /// The proof scan ran into unparseable entries; run repair.
    #[error("proof store holds corrupt entries; repair required")]
    StoreCorrupted,
    /// The destination chain rejected the submission.
    #[error("destination chain rejected the claim: {0}")]
    ChainRejected(String),
    /// The submission timed out before any chain response.
    #[error("claim submission timed out")]
    SubmitTimeout,
}

impl FailReason {
    /// Whether a later attempt with the same inputs can succeed without
    /// operator intervention.
    pub fn retryable(&self) -> bool {
        matches!(self, FailReason::SubmitTimeout)
    }
}

/// Claim lifecycle: `Pending` → `Confirmed` or `Failed` (terminal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum ClaimStatus {
    Pending,
    Confirmed,
    Failed(FailReason),
}

/// One redemption attempt, created per `redeem` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionClaim {
    /// Attempt id, for log correlation.
    pub id: Uuid,
    /// Canonical holder address.
    pub holder_address: String,
    /// Canonical token ids.
    pub token_ids: Vec<u64>,
    /// Source-chain burn transaction the holder presented.
    pub source_tx_hash: String,
    /// Destination-chain transaction, present only on `Confirmed`.
    pub destination_tx_hash: Option<String>,
    /// Terminal outcome.
    pub status: ClaimStatus,
}

impl RedemptionClaim {
    pub fn is_confirmed(&self) -> bool {
        matches!(self.status, ClaimStatus::Confirmed)
    }

    /// Reason code, when the claim failed.
    pub fn fail_reason(&self) -> Option<&FailReason> {
        match &self.status {
            ClaimStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Envelope for one cached value. Millisecond expiry so short TTLs are
/// observable in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// JSON payload, opaque to the cache.
    pub value: serde_json::Value,
    /// Write time, unix milliseconds.
    pub written_at_ms: u64,
    /// Time to live, milliseconds.
    pub ttl_ms: u64,
}

impl CacheEntry {
    pub fn expired(&self, now_ms: u64) -> bool {
        now_ms > self.written_at_ms.saturating_add(self.ttl_ms)
    }
}

/// Render a digest as `0x`-prefixed lowercase hex.
pub fn to_0x_hex(bytes: &[u8]) -> String {
    let mut s = String::from("0x");
    s.push_str(&hex::encode(bytes));
    s
}

/// Parse a `0x`-prefixed 32-byte hex digest.
pub fn digest_from_hex(s: &str) -> Option<Digest32> {
    let raw = s.strip_prefix("0x")?;
    if raw.len() != 64 {
        return None;
    }
    let bytes = hex::decode(raw).ok()?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Some(out)
}

/// Current unix time in seconds.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_secs()
}

/// Current unix time in milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_millis() as u64
}
