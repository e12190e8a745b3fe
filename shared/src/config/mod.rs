//! Configuration module with client-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis connection used for session persistence
//! - `environment` - Environment detection and logging configuration
//! - `gateway` - OTP backend location and request bounds
//! - `session` - Session token persistence

pub mod cache;
pub mod environment;
pub mod gateway;
pub mod session;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use gateway::{GatewayConfig, GatewayMode, SEND_OTP_PATH, VERIFY_OTP_PATH};
pub use session::{SessionBackend, SessionConfig};

/// Timing and retry settings for the login flow
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FlowSettings {
    /// Seconds a user must wait before a code can be resent
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u32,

    /// Rejected verifications tolerated per challenge before the flow fails
    #[serde(default = "default_max_verify_attempts")]
    pub max_verify_attempts: u32,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            cooldown_seconds: default_cooldown_seconds(),
            max_verify_attempts: default_max_verify_attempts(),
        }
    }
}

fn default_cooldown_seconds() -> u32 {
    30
}

fn default_max_verify_attempts() -> u32 {
    5
}

/// Complete client configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// OTP backend configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Session persistence configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Redis configuration (used when the session backend is Redis)
    #[serde(default)]
    pub cache: CacheConfig,

    /// Login flow settings
    #[serde(default)]
    pub flow: FlowSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let logging = LoggingConfig::for_environment(environment).with_env_overrides();

        Self {
            environment,
            gateway: GatewayConfig::from_env(),
            session: SessionConfig::from_env(),
            cache: CacheConfig::from_env(),
            flow: FlowSettings::default(),
            logging,
        }
    }

    /// Check the configuration is usable at startup
    pub fn validate(&self) -> Result<(), String> {
        self.gateway.validate()?;

        if self.session.key.trim().is_empty() {
            return Err("Session key must not be empty".to_string());
        }
        if self.session.ttl_days == 0 {
            return Err("Session lifetime must be at least one day".to_string());
        }
        if self.flow.max_verify_attempts == 0 {
            return Err("At least one verification attempt must be allowed".to_string());
        }

        Ok(())
    }
}
