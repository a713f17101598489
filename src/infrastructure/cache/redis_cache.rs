//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, decode_payload};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, Value, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Redis cache for mapping lookups. Also works against KeyDB.
///
/// Uses `ConnectionManager` for automatic reconnection and cheap clones per
/// request. Backend failures are returned to the caller; only the payload
/// decode step is lenient, reporting bad values as [`CacheError::Corrupted`].
pub struct RedisCache {
    client: ConnectionManager,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    CacheError::OperationError(format!("{operation}: {err}"))
}

/// True for `WRONGTYPE` replies, i.e. the slot holds a non-string value.
fn is_wrong_type(err: &redis::RedisError) -> bool {
    err.code() == Some("WRONGTYPE")
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `key_prefix` - namespace prepended to every key; may be empty
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: key_prefix.into(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Describes a slot of the wrong Redis type, e.g. `<list>`.
    async fn describe_slot(&self, full_key: &str) -> String {
        let mut conn = self.client.clone();
        match redis::cmd("TYPE")
            .arg(full_key)
            .query_async::<String>(&mut conn)
            .await
        {
            Ok(kind) => format!("<{kind}>"),
            Err(_) => "<unknown type>".to_string(),
        }
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.get::<_, Value>(&full_key).await {
            Ok(Value::Nil) => {
                debug!(key = %key, "Cache MISS");
                Ok(None)
            }
            Ok(Value::BulkString(bytes)) => decode_payload(key, bytes).map(Some),
            Ok(Value::SimpleString(value)) => decode_payload(key, value.into_bytes()).map(Some),
            Ok(other) => Err(CacheError::Corrupted {
                key: key.to_string(),
                payload: format!("{other:?}"),
            }),
            Err(e) if is_wrong_type(&e) => Err(CacheError::Corrupted {
                key: key.to_string(),
                payload: self.describe_slot(&full_key).await,
            }),
            Err(e) => {
                warn!(key = %key, error = %e, "Redis GET error");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.set::<_, _, ()>(&full_key, value).await {
            Ok(()) => {
                debug!(key = %key, "Cache SET");
                Ok(())
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Redis SET error");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&full_key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!(key = %key, "Cache DEL");
                }
                Ok(())
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Redis DEL error");
                Err(map_redis_error("failed to delete value from Redis", e))
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
