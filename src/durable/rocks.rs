use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rocksdb::{Direction, IteratorMode, Options, DB};

use crate::durable::error::DurableStoreError;
use crate::traits::DurableStore;

/// Concrete RocksDB durable store.
pub struct RocksDurableStore {
    db: Arc<DB>,
}

impl RocksDurableStore {
    pub fn open(path: &str) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl DurableStore for RocksDurableStore {
    fn name(&self) -> &'static str {
        "rocksdb"
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .put(key.as_bytes(), value.as_bytes())
            .map_err(|e| DurableStoreError::Io(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let raw = self
            .db
            .get(key.as_bytes())
            .map_err(|e| DurableStoreError::Io(e.to_string()))?;
        match raw {
            Some(bytes) => Ok(Some(String::from_utf8(bytes)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.db
            .delete(key.as_bytes())
            .map_err(|e| DurableStoreError::Io(e.to_string()))?;
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();

        let iter = self
            .db
            .iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward));

        for item in iter {
            let (raw_key, raw_value) = item.map_err(|e| DurableStoreError::Io(e.to_string()))?;
            if !raw_key.starts_with(prefix.as_bytes()) {
                // Prefix range ended; stop.
                break;
            }
            let key = String::from_utf8(raw_key.to_vec())?;
            let value = String::from_utf8(raw_value.to_vec())?;
            out.push((key, value));
        }

        Ok(out)
    }
}
