//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
    /// The slot exists but does not hold a well-formed string value.
    #[error("Corrupted cache value for key '{key}': {payload}")]
    Corrupted { key: String, payload: String },
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Decodes a raw cached payload into a string value.
///
/// Mapping values are never empty and always UTF-8; anything else is reported
/// as [`CacheError::Corrupted`] carrying a printable rendition of the bytes.
pub fn decode_payload(key: &str, bytes: Vec<u8>) -> CacheResult<String> {
    match String::from_utf8(bytes) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) => Err(CacheError::Corrupted {
            key: key.to_string(),
            payload: "<empty>".to_string(),
        }),
        Err(e) => Err(CacheError::Corrupted {
            key: key.to_string(),
            payload: format!("{:?}", String::from_utf8_lossy(e.as_bytes())),
        }),
    }
}

/// Key-value cache for mapping lookups.
///
/// Keys are either long URLs or short codes; values are the other half of the
/// mapping. Implementations decode stored payloads and report malformed ones
/// as [`CacheError::Corrupted`] instead of returning them.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis / KeyDB backend
/// - [`crate::infrastructure::cache::MemoryCache`] - process-local map
/// - [`crate::infrastructure::cache::NullCache`] - caching disabled
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on a well-formed hit
    /// - `Ok(None)` when the key is absent
    ///
    /// # Errors
    ///
    /// - [`CacheError::Corrupted`] if the slot holds a non-string or malformed value
    /// - [`CacheError::OperationError`] / [`CacheError::ConnectionError`] if the
    ///   backend cannot be reached
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, overwriting any previous value. No expiry.
    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
