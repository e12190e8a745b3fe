//! Redis client implementation
//!
//! Wraps a multiplexed connection with retry on connect and on transient
//! command failures. Keys are prefixed with `CacheConfig::key_prefix`.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::cache::CacheConfig;
use crate::InfrastructureError;

/// Upper bound for the backoff between attempts
const MAX_RETRY_DELAY_MS: u64 = 5000;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client with connection retry
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    config: CacheConfig,
}

impl RedisClient {
    /// Connect to Redis
    ///
    /// Connection attempts are retried `config.max_retries` times with
    /// exponential backoff starting at `config.retry_delay_ms`.
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Connected client, `Config` for
    ///   an unparsable URL, `Cache` if every attempt failed
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::connect_with_retry(&client, config.max_retries, config.retry_delay_ms).await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    async fn connect_with_retry(
        client: &Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Connecting to Redis");

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_retries => {
                    warn!(
                        attempt = attempts,
                        max_retries,
                        delay_ms = delay,
                        error = %e,
                        "Failed to connect to Redis, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!(attempts, error = %e, "Failed to connect to Redis");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Configuration this client was created with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Set `key` to `value`, expiring after `expiry_seconds`
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        let key = self.config.prefixed_key(key);
        debug!(key = %key, expiry_seconds, "Setting key");

        let value = value.to_string();
        self.execute_with_retry(|mut conn| {
            let key = key.clone();
            let value = value.clone();
            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
        .map_err(|e| {
            error!(key = %key, error = %e, "Failed to set key");
            InfrastructureError::Cache(e)
        })
    }

    /// Get the value of `key`, `None` if absent or expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let key = self.config.prefixed_key(key);
        debug!(key = %key, "Getting key");

        self.execute_with_retry(|mut conn| {
            let key = key.clone();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(|e| {
            error!(key = %key, error = %e, "Failed to get key");
            InfrastructureError::Cache(e)
        })
    }

    /// Delete `key`; returns whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = self.config.prefixed_key(key);
        debug!(key = %key, "Deleting key");

        let deleted = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await
            .map_err(|e| {
                error!(key = %key, error = %e, "Failed to delete key");
                InfrastructureError::Cache(e)
            })?;

        Ok(deleted > 0)
    }

    /// Remaining lifetime of `key` in seconds
    ///
    /// `None` if the key does not exist or has no expiry.
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let key = self.config.prefixed_key(key);

        let ttl = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await
            .map_err(|e| {
                error!(key = %key, error = %e, "Failed to get TTL");
                InfrastructureError::Cache(e)
            })?;

        Ok((ttl >= 0).then_some(ttl))
    }

    /// PING the server
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let response = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await
            .map_err(|e| {
                error!(error = %e, "Redis health check failed");
                InfrastructureError::Cache(e)
            })?;

        Ok(response == "PONG")
    }

    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;

            match operation(self.connection.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && is_retriable_error(&e) => {
                    warn!(
                        attempt = attempts,
                        max_retries = self.config.max_retries,
                        delay_ms = delay,
                        error = %e,
                        "Redis operation failed, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether a Redis error is transient
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Hide credentials in a Redis URL
pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.find('@'), url.find("://")) {
        return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
    }
    url.to_string()
}
