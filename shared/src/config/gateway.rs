//! OTP backend gateway configuration

use serde::{Deserialize, Serialize};

/// Environment variables consulted for the backend base URL, in order
pub const BASE_URL_VARS: [&str; 3] = ["OTP_BASE_URL", "VITE_BASE_URL", "BASE_URL"];

/// Path of the send-code endpoint, relative to the base URL
pub const SEND_OTP_PATH: &str = "/api/login/send-otp";

/// Path of the verify-code endpoint, relative to the base URL
pub const VERIFY_OTP_PATH: &str = "/api/login/verify-otp";

/// Which gateway implementation the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    /// Real backend over HTTP
    #[default]
    Http,
    /// In-process mock backend for development
    Mock,
}

impl std::str::FromStr for GatewayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(GatewayMode::Http),
            "mock" => Ok(GatewayMode::Mock),
            _ => Err(format!("Invalid gateway mode: {}", s)),
        }
    }
}

/// OTP backend gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Backend base URL, e.g. `https://api.example.com`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Upper bound for a single request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Gateway implementation
    #[serde(default)]
    pub mode: GatewayMode,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            mode: GatewayMode::default(),
        }
    }
}

impl GatewayConfig {
    /// Create a configuration pointing at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = BASE_URL_VARS
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()));
        let request_timeout_secs = lookup("OTP_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_request_timeout_secs);
        let mode = lookup("OTP_GATEWAY_MODE")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            base_url,
            request_timeout_secs,
            mode,
        }
    }

    /// Base URL without trailing slashes
    pub fn normalized_base_url(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
    }

    /// Check that the configuration can drive the selected gateway
    pub fn validate(&self) -> Result<(), String> {
        if self.mode == GatewayMode::Mock {
            return Ok(());
        }

        let url = self
            .normalized_base_url()
            .ok_or_else(|| format!("Backend base URL is not set (expected one of {:?})", BASE_URL_VARS))?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("Backend base URL must start with http:// or https://: {}", url));
        }

        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than zero".to_string());
        }

        Ok(())
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}
