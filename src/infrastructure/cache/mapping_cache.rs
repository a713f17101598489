//! Trust-but-verify accessor over a [`CacheService`].

use std::sync::Arc;

use super::service::{CacheError, CacheResult, CacheService};
use tracing::{debug, warn};

/// Namespace of slots keyed by long URL, holding a short code.
pub const URL_KEY_PREFIX: &str = "url:";
/// Namespace of slots keyed by short code, holding a long URL.
pub const CODE_KEY_PREFIX: &str = "code:";

/// Cache key under which the short code for `long_url` is stored.
pub fn url_key(long_url: &str) -> String {
    format!("{URL_KEY_PREFIX}{long_url}")
}

/// Cache key under which the long URL for `short_code` is stored.
pub fn code_key(short_code: &str) -> String {
    format!("{CODE_KEY_PREFIX}{short_code}")
}

/// Mapping-level view of the cache used by the resolver.
///
/// Each direction lives in its own namespace, so a long URL that happens to
/// equal some short code never shadows that code's slot.
///
/// Corrupted slots never reach the caller: they are deleted, logged and
/// reported as a miss. Any other backend failure is propagated.
#[derive(Clone)]
pub struct MappingCache {
    backend: Arc<dyn CacheService>,
}

impl MappingCache {
    pub fn new(backend: Arc<dyn CacheService>) -> Self {
        Self { backend }
    }

    /// Cached short code for `long_url`, if any.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the cache is unreachable, including when
    /// the purge of a corrupted slot fails.
    pub async fn short_code_for(&self, long_url: &str) -> CacheResult<Option<String>> {
        self.lookup(&url_key(long_url)).await
    }

    /// Cached long URL for `short_code`, if any.
    ///
    /// # Errors
    ///
    /// Same as [`MappingCache::short_code_for`].
    pub async fn long_url_for(&self, short_code: &str) -> CacheResult<Option<String>> {
        self.lookup(&code_key(short_code)).await
    }

    pub async fn store_short_code(&self, long_url: &str, short_code: &str) -> CacheResult<()> {
        self.backend.set(&url_key(long_url), short_code).await
    }

    pub async fn store_long_url(&self, short_code: &str, long_url: &str) -> CacheResult<()> {
        self.backend.set(&code_key(short_code), long_url).await
    }

    /// Looks up `key`, purging it if the stored payload is malformed.
    async fn lookup(&self, key: &str) -> CacheResult<Option<String>> {
        match self.backend.get(key).await {
            Ok(Some(value)) => {
                debug!(key = %key, "Cache HIT");
                metrics::counter!("cache_hit_total").increment(1);
                Ok(Some(value))
            }
            Ok(None) => {
                debug!(key = %key, "Cache MISS");
                metrics::counter!("cache_miss_total").increment(1);
                Ok(None)
            }
            Err(CacheError::Corrupted { key: bad_key, payload }) => {
                warn!(key = %bad_key, payload = %payload, "Bad cached value, evicting");
                metrics::counter!("cache_corruption_total").increment(1);
                self.backend.delete(&bad_key).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
