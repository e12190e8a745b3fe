//! Error types raised at the collaborator boundaries of the login flow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized outcome of a failed gateway call
///
/// The gateway never lets a transport failure escape in any other shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend answered and declined the request (wrong code, rate limit, ...)
    #[error("{0}")]
    Rejected(String),

    /// No usable answer (network, timeout, 5xx, malformed body)
    #[error("{0}")]
    Unreachable(String),
}

impl GatewayError {
    /// Message suitable for display
    pub fn message(&self) -> &str {
        match self {
            GatewayError::Rejected(message) | GatewayError::Unreachable(message) => message,
        }
    }

    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Rejected(_) => ErrorKind::Rejected,
            GatewayError::Unreachable(_) => ErrorKind::Unreachable,
        }
    }
}

/// Session persistence failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("Session storage error: {0}")]
    Storage(String),
}

/// Classification of every error the login flow can surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    AlreadyInProgress,
    NoPendingChallenge,
    CooldownActive,
    InvalidPhase,
    Superseded,
    Rejected,
    Unreachable,
    NoSessionIssued,
}

impl ErrorKind {
    /// Error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::AlreadyInProgress => "ALREADY_IN_PROGRESS",
            ErrorKind::NoPendingChallenge => "NO_PENDING_CHALLENGE",
            ErrorKind::CooldownActive => "COOLDOWN_ACTIVE",
            ErrorKind::InvalidPhase => "INVALID_PHASE",
            ErrorKind::Superseded => "SUPERSEDED",
            ErrorKind::Rejected => "REJECTED",
            ErrorKind::Unreachable => "UNREACHABLE",
            ErrorKind::NoSessionIssued => "NO_SESSION_ISSUED",
        }
    }

    /// Rejected-class errors are shown the same way as a backend refusal
    pub fn is_rejection(&self) -> bool {
        matches!(self, ErrorKind::Rejected | ErrorKind::NoSessionIssued)
    }

    /// Errors raised before any network call was made
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ErrorKind::Validation
                | ErrorKind::AlreadyInProgress
                | ErrorKind::NoPendingChallenge
                | ErrorKind::CooldownActive
                | ErrorKind::InvalidPhase
        )
    }
}
