pub mod error;
pub mod memory;
pub mod noop;
pub mod rocks;
pub mod variant;

pub use error::DurableStoreError;
pub use memory::MemoryDurableStore;
pub use noop::NoopDurableStore;
pub use rocks::RocksDurableStore;
pub use variant::DurableStoreVariant;
