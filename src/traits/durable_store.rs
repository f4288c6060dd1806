use anyhow::Result;
use async_trait::async_trait;

/// Trait for the durable key/value layer behind the tiered cache and the
/// burn ledger.
///
/// String keys, JSON-string values. Implementations report capacity
/// exhaustion via `DurableStoreError::CapacityExhausted` so the cache can
/// run its eviction pass.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Store name for logging.
    fn name(&self) -> &'static str;

    async fn put(&self, key: &str, value: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// All `(key, value)` pairs whose key starts with `prefix`.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>>;
}
