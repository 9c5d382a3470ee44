use async_trait::async_trait;
use pinhole_core::error::{Result, StoreError};
use pinhole_core::{KeyValueStore, KvMappingStore, ListPage};
use redis::AsyncCommands;
use tracing::{debug, trace, warn};

/// A Redis-based implementation of [`KeyValueStore`].
///
/// Values are plain Redis strings. Conditional writes use `SET NX` and
/// listing walks the keyspace with `SCAN`, so a listing may return a key
/// more than once.
#[derive(Clone)]
pub struct RedisKv {
    conn: redis::aio::MultiplexedConnection,
}

impl std::fmt::Debug for RedisKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKv").finish_non_exhaustive()
    }
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StoreError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        StoreError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Operation(message)
    }
}

/// Escapes glob metacharacters so `prefix` matches literally in `SCAN MATCH`.
fn match_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

impl RedisKv {
    /// Wraps an existing multiplexed connection.
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens a multiplexed connection to `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| map_redis_error("invalid Redis URL", e))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl KeyValueStore for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "GET from Redis");

        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key).await.map_err(|e| {
            warn!(key, error = %e, "Redis error on get");
            map_redis_error("failed to fetch value from Redis", e)
        })
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        trace!(key, "SET in Redis");

        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await.map_err(|e| {
            warn!(key, error = %e, "Redis error on set");
            map_redis_error("failed to write value to Redis", e)
        })
    }

    async fn put_if_absent(&self, key: &str, value: String) -> Result<bool> {
        trace!(key, "SET NX in Redis");

        let mut conn = self.conn.clone();
        let written = conn.set_nx::<_, _, bool>(key, value).await.map_err(|e| {
            warn!(key, error = %e, "Redis error on set nx");
            map_redis_error("failed to conditionally write value to Redis", e)
        })?;

        debug!(key, written, "SET NX completed");
        Ok(written)
    }

    async fn list(&self, prefix: &str, cursor: Option<String>, limit: usize) -> Result<ListPage> {
        let start = cursor.unwrap_or_else(|| "0".to_string());
        trace!(prefix, cursor = %start, "SCAN in Redis");

        let mut conn = self.conn.clone();
        let (next, keys): (String, Vec<String>) = redis::cmd("SCAN")
            .arg(&start)
            .arg("MATCH")
            .arg(match_pattern(prefix))
            .arg("COUNT")
            .arg(limit.max(1))
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(prefix, error = %e, "Redis error on scan");
                map_redis_error("failed to scan Redis keyspace", e)
            })?;

        // A zero cursor ends the iteration.
        let cursor = (next != "0").then_some(next);
        Ok(ListPage { keys, cursor })
    }
}

/// A mapping store persisted in Redis.
pub type RedisMappingStore = KvMappingStore<RedisKv>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_pattern_appends_wildcard() {
        assert_eq!(match_pattern("pinhole:url:"), "pinhole:url:*");
    }

    #[test]
    fn match_pattern_escapes_glob_characters() {
        assert_eq!(match_pattern("a*b?[c]\\"), "a\\*b\\?\\[c\\]\\\\*");
    }
}
