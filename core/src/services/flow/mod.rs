//! Login flow state machine
//!
//! This module drives a single OTP login from the first send to an issued
//! session:
//! - Phase tracking with enforced invariants
//! - One outstanding request at a time
//! - Resend cooldown on a cancelable timer
//! - Session persistence on success

mod config;
mod cooldown;
mod machine;

#[cfg(test)]
mod tests;

pub use config::{FlowConfig, DEFAULT_COOLDOWN_SECONDS, DEFAULT_MAX_VERIFY_ATTEMPTS};
pub use cooldown::CooldownTimer;
pub use machine::{
    OtpFlow, NO_USER_DATA_MESSAGE, RESENT_MESSAGE, SENT_MESSAGE, VERIFIED_MESSAGE,
};
