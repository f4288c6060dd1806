use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::durable::error::DurableStoreError;
use crate::traits::DurableStore;

/// In-memory durable store for tests and single-process runs.
///
/// An optional entry cap makes it the vehicle for exercising the cache's
/// capacity-eviction pass: inserting a new key at the cap fails with
/// `CapacityExhausted`, overwrites always succeed.
#[derive(Clone)]
pub struct MemoryDurableStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    max_entries: Option<usize>,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            max_entries: None,
        }
    }

    pub fn with_capacity_limit(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            max_entries: Some(max_entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryDurableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableStore for MemoryDurableStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(max) = self.max_entries {
            if entries.len() >= max && !entries.contains_key(key) {
                return Err(DurableStoreError::CapacityExhausted {
                    entries: entries.len(),
                }
                .into());
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let entries = self.entries.lock().unwrap();
        let mut out: Vec<(String, String)> = entries
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }
}
