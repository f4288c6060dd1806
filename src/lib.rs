// Library exports for testing and external use

pub mod bridge;
pub mod cache;
pub mod commitment;
pub mod config;
pub mod durable;
pub mod feed;
pub mod gateway;
pub mod keys;
pub mod proofs;
pub mod redemption;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use bridge::AshBridge;
pub use config::{BaseConfig, FeedType, GatewayType, RegistryType};
pub use keys::ProofKey;
pub use traits::{BurnFeed, ClaimGateway, DurableStore, RootRegistry};
pub use types::{
    BurnRecord, ClaimReceipt, ClaimStatus, Digest32, EpochCommitment, FailReason, MembershipProof,
    ObservedBurn, RedemptionClaim, StoredProof,
};

// Re-export variant enums for convenience
pub use durable::{DurableStoreVariant, MemoryDurableStore};
pub use feed::{BurnFeedVariant, MockBurnFeed};
pub use gateway::{ClaimGatewayVariant, MockClaimGateway, RootRegistryVariant, SimulatedChain};
