//! Session persistence configuration

use serde::{Deserialize, Serialize};

/// Default key under which the access token is stored
pub const DEFAULT_SESSION_KEY: &str = "accessToken";

/// Default lifetime of a persisted session, in days
pub const DEFAULT_SESSION_TTL_DAYS: u32 = 7;

/// Where the session token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Process memory (development and tests)
    #[default]
    Memory,
    /// Redis key with expiry
    Redis,
}

impl std::str::FromStr for SessionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "redis" => Ok(SessionBackend::Redis),
            _ => Err(format!("Invalid session backend: {}", s)),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: SessionBackend,

    /// Fixed key for the token slot
    #[serde(default = "default_key")]
    pub key: String,

    /// Token lifetime in days
    #[serde(default = "default_ttl_days")]
    pub ttl_days: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            key: default_key(),
            ttl_days: default_ttl_days(),
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let backend = std::env::var("OTP_SESSION_BACKEND")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let key = std::env::var("OTP_SESSION_KEY").unwrap_or_else(|_| default_key());

        Self {
            backend,
            key,
            ..Default::default()
        }
    }

    /// Token lifetime in seconds
    pub fn ttl_seconds(&self) -> u64 {
        u64::from(self.ttl_days) * 86_400
    }
}

fn default_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

fn default_ttl_days() -> u32 {
    DEFAULT_SESSION_TTL_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_config() {
        let config = SessionConfig::default();
        assert_eq!(config.backend, SessionBackend::Memory);
        assert_eq!(config.key, "accessToken");
        assert_eq!(config.ttl_seconds(), 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("redis".parse::<SessionBackend>().unwrap(), SessionBackend::Redis);
        assert_eq!("Memory".parse::<SessionBackend>().unwrap(), SessionBackend::Memory);
        assert!("cookie".parse::<SessionBackend>().is_err());
    }
}
