//! # OTP Login Core
//!
//! Domain layer of the mobile-number OTP login client.
//! This crate contains the domain entities, the gateway and session-store
//! contracts, the error taxonomy, and the login state machine that ties
//! them together.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
