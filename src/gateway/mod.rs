pub mod error;
pub mod http;
pub mod mock;
pub mod noop;
pub mod sim;
pub mod variant;

pub use error::GatewayError;
pub use http::{HttpClaimGateway, HttpRootRegistry};
pub use mock::{MockClaimGateway, MockOutcome, SubmittedClaim};
pub use noop::{NoopClaimGateway, NoopRootRegistry};
pub use sim::SimulatedChain;
pub use variant::{ClaimGatewayVariant, RootRegistryVariant};
