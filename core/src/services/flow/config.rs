//! Configuration for the login flow

use std::time::Duration;

use otp_shared::config::{FlowSettings, SessionConfig};

use crate::domain::entities::SESSION_TTL_DAYS;

/// Seconds before a code can be resent
pub const DEFAULT_COOLDOWN_SECONDS: u32 = 30;

/// Rejected verifications tolerated per challenge
pub const DEFAULT_MAX_VERIFY_ATTEMPTS: u32 = 5;

/// Configuration for the login flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    /// Cooldown started each time a code is (re)issued
    pub cooldown_seconds: u32,
    /// Rejected verifications before the flow moves to `Failed`
    pub max_verify_attempts: u32,
    /// Length of one cooldown tick
    pub tick: Duration,
    /// Lifetime of the persisted session in days
    pub session_ttl_days: i64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
            max_verify_attempts: DEFAULT_MAX_VERIFY_ATTEMPTS,
            tick: Duration::from_secs(1),
            session_ttl_days: SESSION_TTL_DAYS,
        }
    }
}

impl FlowConfig {
    /// Build from the shared client settings
    pub fn from_settings(flow: &FlowSettings, session: &SessionConfig) -> Self {
        Self {
            cooldown_seconds: flow.cooldown_seconds,
            max_verify_attempts: flow.max_verify_attempts.max(1),
            session_ttl_days: i64::from(session.ttl_days),
            ..Default::default()
        }
    }
}
