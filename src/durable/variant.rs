use anyhow::Result;
use async_trait::async_trait;

use super::{memory::MemoryDurableStore, noop::NoopDurableStore, rocks::RocksDurableStore};
use crate::traits::DurableStore;

/// Enum representing all possible durable store implementations.
pub enum DurableStoreVariant {
    Rocks(RocksDurableStore),
    Memory(MemoryDurableStore),
    Noop(NoopDurableStore),
}

#[async_trait]
impl DurableStore for DurableStoreVariant {
    fn name(&self) -> &'static str {
        match self {
            DurableStoreVariant::Rocks(inner) => inner.name(),
            DurableStoreVariant::Memory(inner) => inner.name(),
            DurableStoreVariant::Noop(inner) => inner.name(),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        match self {
            DurableStoreVariant::Rocks(inner) => inner.put(key, value).await,
            DurableStoreVariant::Memory(inner) => inner.put(key, value).await,
            DurableStoreVariant::Noop(inner) => inner.put(key, value).await,
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            DurableStoreVariant::Rocks(inner) => inner.get(key).await,
            DurableStoreVariant::Memory(inner) => inner.get(key).await,
            DurableStoreVariant::Noop(inner) => inner.get(key).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match self {
            DurableStoreVariant::Rocks(inner) => inner.remove(key).await,
            DurableStoreVariant::Memory(inner) => inner.remove(key).await,
            DurableStoreVariant::Noop(inner) => inner.remove(key).await,
        }
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        match self {
            DurableStoreVariant::Rocks(inner) => inner.scan_prefix(prefix).await,
            DurableStoreVariant::Memory(inner) => inner.scan_prefix(prefix).await,
            DurableStoreVariant::Noop(inner) => inner.scan_prefix(prefix).await,
        }
    }
}
