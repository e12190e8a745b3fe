//! Session token stores
//!
//! - `RedisSessionStore`: one Redis key with an expiry
//! - `InMemorySessionStore`: process memory, for development and tests

pub mod memory_store;
pub mod redis_store;


pub use memory_store::InMemorySessionStore;
pub use redis_store::RedisSessionStore;

use std::sync::Arc;

use otp_core::SessionStore;
use otp_shared::config::{CacheConfig, SessionBackend, SessionConfig};

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// Create the session store selected by the configuration
///
/// Connects to Redis up front when the Redis backend is selected.
pub async fn create_session_store(
    session: &SessionConfig,
    cache: &CacheConfig,
) -> Result<Arc<dyn SessionStore>, InfrastructureError> {
    match session.backend {
        SessionBackend::Memory => {
            tracing::info!(key = %session.key, "Using in-memory session store");
            Ok(Arc::new(InMemorySessionStore::new()))
        }
        SessionBackend::Redis => {
            let client = RedisClient::new(cache.clone()).await?;
            tracing::info!(key = %session.key, "Using Redis session store");
            Ok(Arc::new(RedisSessionStore::new(client, session.key.clone())))
        }
    }
}
