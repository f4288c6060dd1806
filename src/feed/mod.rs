pub mod mock;
pub mod noop;
pub mod variant;

pub use mock::MockBurnFeed;
pub use noop::NoopBurnFeed;
pub use variant::BurnFeedVariant;
