//! Redis cache module for the game backend
//!
//! Values are stored as JSON under keys namespaced with a configurable
//! prefix, so several deployments can share one Redis instance. The game
//! service keeps its sessions here when the Redis session backend is selected.

use std::time::Duration;

use anyhow::Result;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::info;

/// Configuration for Redis connection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Prefix prepended to every key, separated by `:`
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            key_prefix: "game".to_string(),
        }
    }
}

/// Redis connection pool
#[derive(Debug)]
pub struct RedisPool {
    client: Client,
    key_prefix: String,
}

impl RedisPool {
    /// Initialize a new Redis connection pool
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool {
            client,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Full key under this pool's namespace
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Store a value as JSON, expiring after `ttl` (at least one second)
    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let mut conn = self.get_connection().await?;
        let _: () = conn
            .set_ex(self.namespaced(key), raw, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    /// Load a JSON value, `None` when the key is missing or expired
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = conn.get(self.namespaced(key)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Delete a key from Redis
    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(self.namespaced(key)).await?;
        Ok(())
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}
