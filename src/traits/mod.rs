pub mod burn_feed;
pub mod claim_gateway;
pub mod durable_store;
pub mod root_registry;

pub use burn_feed::BurnFeed;
pub use claim_gateway::ClaimGateway;
pub use durable_store::DurableStore;
pub use root_registry::RootRegistry;
