//! # Infrastructure Layer
//!
//! Concrete implementations of the contracts defined in `otp_core`:
//!
//! - **Gateway**: HTTP client for the OTP backend and an in-process mock
//! - **HTTP**: Transport seam over `reqwest` with a bounded timeout
//! - **Cache**: Redis client with connection retry
//! - **Session**: Session token stores backed by Redis or process memory
//!
//! Configuration is assembled by [`load_config`].

use otp_core::errors::SessionStoreError;
use otp_shared::config::ClientConfig;

pub mod cache;
pub mod gateway;
pub mod http;
pub mod session;

pub use cache::RedisClient;
pub use gateway::{HttpOtpGateway, MockOtpGateway};
pub use http::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};
pub use session::{InMemorySessionStore, RedisSessionStore};

/// Prefix of environment variables overriding file configuration
pub const ENV_OVERRIDE_PREFIX: &str = "OTP";

/// Load client configuration
///
/// Sources, lowest precedence first:
/// 1. Defaults and plain environment variables (`ClientConfig::from_env`)
/// 2. Optional `config.{environment}.toml` in the working directory
/// 3. `OTP__SECTION__KEY` environment variables
///
/// A `.env` file is loaded first if present. The result is validated, so a
/// missing backend URL is reported here rather than on the first request.
pub fn load_config() -> Result<ClientConfig, InfrastructureError> {
    dotenvy::dotenv().ok();

    let defaults = ClientConfig::from_env();
    let file = defaults.environment.config_file().to_string();

    let settings = config::Config::builder()
        .add_source(config::Config::try_from(&defaults)?)
        .add_source(config::File::with_name(&file).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_OVERRIDE_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let client_config: ClientConfig = settings.try_deserialize()?;
    client_config.validate().map_err(InfrastructureError::Config)?;

    tracing::debug!(
        environment = %client_config.environment,
        gateway_mode = ?client_config.gateway.mode,
        session_backend = ?client_config.session.backend,
        event = "config_loaded",
        "Configuration loaded"
    );

    Ok(client_config)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP client error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<config::ConfigError> for InfrastructureError {
    fn from(err: config::ConfigError) -> Self {
        InfrastructureError::Config(err.to_string())
    }
}

impl From<InfrastructureError> for SessionStoreError {
    fn from(err: InfrastructureError) -> Self {
        SessionStoreError::Storage(err.to_string())
    }
}
