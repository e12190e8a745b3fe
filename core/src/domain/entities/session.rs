//! Authenticated session issued after a successful verification.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Session lifetime (7 days)
pub const SESSION_TTL_DAYS: i64 = 7;

/// A fully authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Opaque access token issued by the backend
    pub token: String,

    /// When the session was created on this client
    pub issued_at: DateTime<Utc>,

    /// When the persisted token should be discarded
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Creates a session issued now with the standard lifetime
    pub fn new(token: impl Into<String>) -> Self {
        Self::issued_at(token, Utc::now(), SESSION_TTL_DAYS)
    }

    /// Creates a session with an explicit issue time and lifetime in days
    pub fn issued_at(token: impl Into<String>, issued_at: DateTime<Utc>, ttl_days: i64) -> Self {
        Self {
            token: token.into(),
            issued_at,
            expires_at: issued_at + Duration::days(ttl_days),
        }
    }

    /// Seconds until expiry, zero once expired
    pub fn remaining_seconds(&self) -> u64 {
        let remaining = (self.expires_at - Utc::now()).num_seconds();
        u64::try_from(remaining).unwrap_or(0)
    }

    /// Checks if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
