//! Process-local cache backed by `DashMap`.

use super::service::{CacheError, CacheResult, CacheService, decode_payload};
use async_trait::async_trait;
use dashmap::DashMap;

/// Raw contents of a cache slot.
///
/// Mirrors what a Redis slot can hold so corrupted entries can be seeded: a
/// byte string, or a value of some other type such as a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSlot {
    Bytes(Vec<u8>),
    List(Vec<String>),
}

impl From<&str> for CacheSlot {
    fn from(value: &str) -> Self {
        Self::Bytes(value.as_bytes().to_vec())
    }
}

/// In-memory [`CacheService`] with the same decode rules as the Redis backend.
///
/// Entries never expire. Useful for single-process deployments and tests.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slots: DashMap<String, CacheSlot>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw slot, bypassing encoding. Used to plant malformed values.
    pub fn insert_raw(&self, key: impl Into<String>, slot: CacheSlot) {
        self.slots.insert(key.into(), slot);
    }

    /// Returns true if `key` currently has a slot, well-formed or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let Some(slot) = self.slots.get(key).map(|s| s.clone()) else {
            return Ok(None);
        };

        match slot {
            CacheSlot::Bytes(bytes) => decode_payload(key, bytes).map(Some),
            CacheSlot::List(items) => Err(CacheError::Corrupted {
                key: key.to_string(),
                payload: format!("<list> {items:?}"),
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.slots.insert(key.to_string(), CacheSlot::from(value));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.slots.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
