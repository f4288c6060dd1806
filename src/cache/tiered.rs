//! Two-tier best-effort cache: a volatile in-process map in front of a
//! durable backend.
//!
//! The cache is never a source of truth. Every recoverable failure is
//! logged and swallowed; callers always have a recompute path.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::durable::{DurableStoreError, DurableStoreVariant};
use crate::traits::DurableStore;
use crate::types::{now_millis, CacheEntry};

/// Share of namespace entries dropped when purging expired ones was not
/// enough to make room.
const EVICT_SHARE: usize = 4;

pub struct TieredCache {
    namespace: String,
    volatile: RwLock<HashMap<String, CacheEntry>>,
    durable: Arc<DurableStoreVariant>,
}

impl TieredCache {
    pub fn new(namespace: &str, durable: Arc<DurableStoreVariant>) -> Self {
        Self {
            namespace: namespace.to_string(),
            volatile: RwLock::new(HashMap::new()),
            durable,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn prefix(&self) -> String {
        format!("{}/", self.namespace)
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}/{}", self.namespace, key)
    }

    /// Typed read. Volatile first, durable on a miss; a durable hit is
    /// written back into the volatile layer.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                debug!(key, error = %e, "cached value failed to deserialize");
                None
            }
        }
    }

    /// Raw read, same tier walk as `get`. Used by diagnosis so malformed
    /// payloads stay observable instead of collapsing into a miss.
    pub async fn get_value(&self, key: &str) -> Option<serde_json::Value> {
        let full = self.prefixed(key);
        let now = now_millis();

        let mut volatile_expired = false;
        {
            let volatile = self.volatile.read().await;
            match volatile.get(&full) {
                Some(entry) if !entry.expired(now) => return Some(entry.value.clone()),
                Some(_) => volatile_expired = true,
                None => {}
            }
        }
        if volatile_expired {
            let mut volatile = self.volatile.write().await;
            if let Some(entry) = volatile.get(&full) {
                if entry.expired(now_millis()) {
                    volatile.remove(&full);
                } else {
                    // refreshed while we waited for the write lock
                    return Some(entry.value.clone());
                }
            }
        }

        let raw = match self.durable.get(&full).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "durable cache read failed");
                return None;
            }
        };
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "unreadable durable cache entry");
                return None;
            }
        };
        if entry.expired(now_millis()) {
            if let Err(e) = self.durable.remove(&full).await {
                debug!(key, error = %e, "failed to drop expired durable entry");
            }
            return None;
        }

        let value = entry.value.clone();
        self.volatile.write().await.insert(full, entry);
        Some(value)
    }

    /// Write to the volatile layer, and to the durable layer when
    /// `persist`. Durable failures never reach the caller: capacity
    /// exhaustion triggers the eviction pass, anything else is logged.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration, persist: bool) {
        let json = match serde_json::to_value(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "value refused json serialization, not cached");
                return;
            }
        };
        let entry = CacheEntry {
            value: json,
            written_at_ms: now_millis(),
            ttl_ms: ttl.as_millis() as u64,
        };
        let full = self.prefixed(key);

        self.volatile
            .write()
            .await
            .insert(full.clone(), entry.clone());

        if !persist {
            return;
        }
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "cache entry refused serialization");
                return;
            }
        };
        self.put_durable_with_eviction(&full, &raw).await;
    }

    /// Reset a key's expiry window from now, in both layers, leaving the
    /// value untouched.
    pub async fn update_ttl(&self, key: &str, new_ttl: Duration) {
        let full = self.prefixed(key);
        let now = now_millis();
        let ttl_ms = new_ttl.as_millis() as u64;

        {
            let mut volatile = self.volatile.write().await;
            if let Some(entry) = volatile.get_mut(&full) {
                entry.written_at_ms = now;
                entry.ttl_ms = ttl_ms;
            }
        }

        match self.durable.get(&full).await {
            Ok(Some(raw)) => {
                let Ok(mut entry) = serde_json::from_str::<CacheEntry>(&raw) else {
                    warn!(key, "unreadable durable entry, ttl not updated");
                    return;
                };
                entry.written_at_ms = now;
                entry.ttl_ms = ttl_ms;
                match serde_json::to_string(&entry) {
                    Ok(raw) => {
                        if let Err(e) = self.durable.put(&full, &raw).await {
                            warn!(key, error = %e, "durable ttl update failed");
                        }
                    }
                    Err(e) => warn!(key, error = %e, "cache entry refused serialization"),
                }
            }
            Ok(None) => {}
            Err(e) => warn!(key, error = %e, "durable cache read failed"),
        }
    }

    pub async fn remove(&self, key: &str) {
        let full = self.prefixed(key);
        self.volatile.write().await.remove(&full);
        if let Err(e) = self.durable.remove(&full).await {
            warn!(key, error = %e, "durable cache remove failed");
        }
    }

    /// Drop everything under this cache's namespace, both layers. Other
    /// namespaces sharing the durable store are untouched.
    pub async fn clear_namespace(&self) {
        self.volatile.write().await.clear();
        let entries = match self.durable.scan_prefix(&self.prefix()).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "durable cache scan failed");
                return;
            }
        };
        for (full, _) in entries {
            if let Err(e) = self.durable.remove(&full).await {
                warn!(key = %full, error = %e, "durable cache remove failed");
            }
        }
    }

    /// Union of non-expired keys across both layers, namespace stripped.
    /// A durable payload that cannot be read still names a key that
    /// exists, so it is listed; diagnosis decides what to do with it.
    pub async fn live_keys(&self) -> Vec<String> {
        let now = now_millis();
        let prefix = self.prefix();
        let mut keys: BTreeSet<String> = BTreeSet::new();

        {
            let volatile = self.volatile.read().await;
            for (full, entry) in volatile.iter() {
                if entry.expired(now) {
                    continue;
                }
                if let Some(stripped) = full.strip_prefix(&prefix) {
                    keys.insert(stripped.to_string());
                }
            }
        }

        match self.durable.scan_prefix(&prefix).await {
            Ok(entries) => {
                for (full, raw) in entries {
                    let live = match serde_json::from_str::<CacheEntry>(&raw) {
                        Ok(entry) => !entry.expired(now),
                        Err(_) => true,
                    };
                    if !live {
                        continue;
                    }
                    if let Some(stripped) = full.strip_prefix(&prefix) {
                        keys.insert(stripped.to_string());
                    }
                }
            }
            Err(e) => warn!(error = %e, "durable cache scan failed"),
        }

        keys.into_iter().collect()
    }

    // ---- durable write path ----

    async fn put_durable_with_eviction(&self, full: &str, raw: &str) {
        let err = match self.durable.put(full, raw).await {
            Ok(()) => return,
            Err(err) => err,
        };
        if !is_capacity(&err) {
            warn!(key = %full, error = %err, "durable cache write failed");
            return;
        }

        let dropped = self.evict_expired().await;
        debug!(dropped, "purged expired entries after capacity failure");
        let err = match self.durable.put(full, raw).await {
            Ok(()) => return,
            Err(err) => err,
        };
        if !is_capacity(&err) {
            warn!(key = %full, error = %err, "durable cache write failed");
            return;
        }

        let dropped = self.evict_oldest_share().await;
        debug!(dropped, "evicted oldest entries after capacity failure");
        if let Err(e) = self.durable.put(full, raw).await {
            warn!(key = %full, error = %e, "durable cache write failed after eviction");
        }
    }

    /// Remove every namespace entry already past its expiry.
    async fn evict_expired(&self) -> usize {
        let now = now_millis();
        let entries = match self.durable.scan_prefix(&self.prefix()).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "durable cache scan failed");
                return 0;
            }
        };

        let mut dropped = 0;
        for (full, raw) in entries {
            let expired = serde_json::from_str::<CacheEntry>(&raw)
                .map(|entry| entry.expired(now))
                .unwrap_or(false);
            if expired && self.durable.remove(&full).await.is_ok() {
                dropped += 1;
            }
        }
        dropped
    }

    /// Remove the oldest quarter of namespace entries by write time.
    /// Unreadable entries count as oldest.
    async fn evict_oldest_share(&self) -> usize {
        let entries = match self.durable.scan_prefix(&self.prefix()).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "durable cache scan failed");
                return 0;
            }
        };
        if entries.is_empty() {
            return 0;
        }

        let mut stamped: Vec<(u64, String)> = entries
            .into_iter()
            .map(|(full, raw)| {
                let written = serde_json::from_str::<CacheEntry>(&raw)
                    .map(|entry| entry.written_at_ms)
                    .unwrap_or(0);
                (written, full)
            })
            .collect();
        stamped.sort();

        let victim_count = (stamped.len() / EVICT_SHARE).max(1);
        let mut dropped = 0;
        for (_, full) in stamped.into_iter().take(victim_count) {
            if self.durable.remove(&full).await.is_ok() {
                dropped += 1;
            }
        }
        dropped
    }
}

fn is_capacity(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DurableStoreError>()
        .map(DurableStoreError::is_capacity)
        .unwrap_or(false)
}
