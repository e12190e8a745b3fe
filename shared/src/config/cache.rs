//! Cache configuration module

use serde::{Deserialize, Serialize};

/// Redis cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Optional prefix prepended to every key
    #[serde(default)]
    pub key_prefix: Option<String>,

    /// Maximum connection attempts before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between attempts in milliseconds (doubles each attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            key_prefix: None,
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let key_prefix = std::env::var("REDIS_KEY_PREFIX").ok().filter(|p| !p.is_empty());

        Self {
            url,
            key_prefix,
            ..Default::default()
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Apply the configured prefix to a key
    pub fn prefixed_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}
