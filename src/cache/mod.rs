pub mod tiered;

pub use tiered::TieredCache;
