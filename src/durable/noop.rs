use anyhow::Result;
use async_trait::async_trait;

use crate::traits::DurableStore;

/// Noop durable store: every read misses, every write vanishes. Useful for
/// volatile-only operation.
pub struct NoopDurableStore;

#[async_trait]
impl DurableStore for NoopDurableStore {
    fn name(&self) -> &'static str {
        "noop-durable"
    }

    async fn put(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn scan_prefix(&self, _prefix: &str) -> Result<Vec<(String, String)>> {
        Ok(Vec::new())
    }
}
