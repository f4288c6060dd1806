pub mod coordinator;
pub mod ledger;

pub use coordinator::RedemptionCoordinator;
pub use ledger::{BurnLedger, BURN_PREFIX};
