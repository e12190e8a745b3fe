//! Trait for session token persistence

use async_trait::async_trait;

use crate::domain::entities::AuthSession;
use crate::errors::SessionStoreError;

/// Durable, expiring slot for the session token
///
/// The login flow only ever writes or clears the slot; it never reads the
/// token back.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store the session token until `session.expires_at`
    async fn store_token(&self, session: &AuthSession) -> Result<(), SessionStoreError>;

    /// Remove any stored token
    async fn clear_token(&self) -> Result<(), SessionStoreError>;
}
