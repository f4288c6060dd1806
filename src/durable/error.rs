use thiserror::Error;

#[derive(Debug, Error)]
pub enum DurableStoreError {
    #[error("durable store at capacity: {entries} entries")]
    CapacityExhausted { entries: usize },

    #[error("durable store i/o failure: {0}")]
    Io(String),
}

impl DurableStoreError {
    /// True when the failure is the capacity kind the cache eviction pass
    /// can do something about.
    pub fn is_capacity(&self) -> bool {
        matches!(self, DurableStoreError::CapacityExhausted { .. })
    }
}
