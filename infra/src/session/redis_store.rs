//! Redis-backed session store

use async_trait::async_trait;
use tracing::{debug, info};

use otp_core::errors::SessionStoreError;
use otp_core::{AuthSession, SessionStore};

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// Session token stored under a single Redis key
///
/// The key expires together with the session, so a stale token is never
/// read back.
pub struct RedisSessionStore {
    client: RedisClient,
    key: String,
}

impl RedisSessionStore {
    /// Create a store writing to `key` (prefixed by the client's key prefix)
    pub fn new(client: RedisClient, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
        }
    }

    /// Key the token is stored under, before prefixing
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored token, if any
    pub async fn token(&self) -> Result<Option<String>, InfrastructureError> {
        self.client.get(&self.key).await
    }

    /// Seconds until the stored token expires
    pub async fn remaining_seconds(&self) -> Result<Option<i64>, InfrastructureError> {
        self.client.ttl(&self.key).await
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn store_token(&self, session: &AuthSession) -> Result<(), SessionStoreError> {
        let ttl = session.remaining_seconds();
        if ttl == 0 {
            debug!(key = %self.key, "Session already expired, clearing slot");
            self.client.delete(&self.key).await?;
            return Ok(());
        }

        self.client
            .set_with_expiry(&self.key, &session.token, ttl)
            .await?;

        info!(
            key = %self.key,
            expires_at = %session.expires_at,
            event = "session_stored",
            "Session token stored"
        );
        Ok(())
    }

    async fn clear_token(&self) -> Result<(), SessionStoreError> {
        let existed = self.client.delete(&self.key).await?;

        info!(key = %self.key, existed, event = "session_cleared", "Session token cleared");
        Ok(())
    }
}
