//! In-memory session store

use async_trait::async_trait;
use tokio::sync::RwLock;

use otp_core::errors::SessionStoreError;
use otp_core::{AuthSession, SessionStore};

/// Session slot held in process memory
///
/// Expired sessions are treated as absent when read back.
#[derive(Default)]
pub struct InMemorySessionStore {
    slot: RwLock<Option<AuthSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored session, if present and not expired
    pub async fn current(&self) -> Option<AuthSession> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|session| !session.is_expired())
            .cloned()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn store_token(&self, session: &AuthSession) -> Result<(), SessionStoreError> {
        *self.slot.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear_token(&self) -> Result<(), SessionStoreError> {
        self.slot.write().await.take();
        Ok(())
    }
}
