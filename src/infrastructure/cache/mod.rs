//! Caching layer in front of the mapping store.
//!
//! Provides a [`CacheService`] backend trait with three implementations and
//! the [`MappingCache`] accessor the resolver talks to:
//! - [`RedisCache`] - Production Redis / KeyDB backend
//! - [`MemoryCache`] - Process-local backend
//! - [`NullCache`] - No-op implementation for disabled caching

mod mapping_cache;
mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use mapping_cache::{CODE_KEY_PREFIX, MappingCache, URL_KEY_PREFIX, code_key, url_key};
pub use memory_cache::{CacheSlot, MemoryCache};
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService, decode_payload};

#[cfg(test)]
pub use service::MockCacheService;
