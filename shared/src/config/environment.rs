//! Deployment environment and log output settings

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Variables naming the environment, most specific first
const ENVIRONMENT_VARS: [&str; 4] = ["OTP_ENV", "ENVIRONMENT", "ENV", "RUST_ENV"];

/// Backend environment the client talks to
///
/// Selects the logging profile and the optional `config.<name>.toml` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// First recognised value among [`ENVIRONMENT_VARS`], else development
    pub fn from_env() -> Self {
        ENVIRONMENT_VARS
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find_map(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Optional override file read by `load_config`
    pub fn config_file(&self) -> String {
        format!("config.{}.toml", self.name())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Where and how much the client logs
///
/// Logs share the terminal with the prompt, so every profile keeps
/// third-party crates at `warn`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    pub fn for_environment(env: Environment) -> Self {
        let (level, format) = match env {
            Environment::Development => ("warn,otp_core=debug,otp_infra=debug", LogFormat::Compact),
            Environment::Staging => ("warn,otp_core=info,otp_infra=info", LogFormat::Compact),
            Environment::Production => ("warn", LogFormat::Json),
        };
        Self {
            level: level.to_string(),
            format,
        }
    }

    /// Apply `LOG_LEVEL` and `LOG_FORMAT`; an unknown format is ignored
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = env::var("LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.level = level;
            }
        }
        if let Some(format) = env::var("LOG_FORMAT").ok().and_then(|f| f.parse().ok()) {
            self.format = format;
        }
        self
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" | "text" => Ok(LogFormat::Compact),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}
