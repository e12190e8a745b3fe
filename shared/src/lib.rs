//! Shared utilities and common types for the OTP login client
//!
//! This crate provides common functionality used across all client modules:
//! - Configuration types
//! - The wire envelope shared by both OTP endpoints
//! - Utility functions (mobile number and code validation, masking)

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    CacheConfig, ClientConfig, Environment, FlowSettings, GatewayConfig, GatewayMode,
    LogFormat, LoggingConfig, SessionBackend, SessionConfig,
};
pub use types::ApiEnvelope;
pub use utils::{phone, validation};
