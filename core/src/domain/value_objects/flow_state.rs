//! Snapshot of a login flow as observed by the presentation layer.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{PendingChallenge, UserRecord};
use crate::errors::{ErrorKind, FlowError};

/// Phase of the login flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Send-code request outstanding
    Sending,
    /// Code delivered, waiting for user input
    AwaitingCode,
    /// Verify-code request outstanding
    Verifying,
    /// Session issued
    Authenticated,
    /// Challenge exhausted; only a reset leaves this phase
    Failed,
}

impl Phase {
    /// Whether a pending challenge must exist in this phase
    pub fn requires_pending(&self) -> bool {
        matches!(self, Phase::AwaitingCode | Phase::Verifying)
    }

    /// Whether this phase is only left through a reset
    pub fn is_absorbing(&self) -> bool {
        matches!(self, Phase::Authenticated | Phase::Failed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Sending => "sending",
            Phase::AwaitingCode => "awaiting code",
            Phase::Verifying => "verifying",
            Phase::Authenticated => "authenticated",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Last error retained for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&FlowError> for ErrorInfo {
    fn from(err: &FlowError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// User-facing success signal emitted by a flow operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Complete observable state of one login flow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    /// Current phase
    pub phase: Phase,

    /// Outstanding challenge
    pub pending: Option<PendingChallenge>,

    /// Number used by the most recent send
    pub mobile_number: Option<String>,

    /// Whether a request is outstanding
    pub in_flight: bool,

    /// Most recent gateway error, cleared by the next request
    pub last_error: Option<ErrorInfo>,

    /// Most recent success message
    pub last_message: Option<String>,

    /// User returned by a successful verification
    pub user: Option<UserRecord>,

    /// Seconds until a resend is allowed
    pub cooldown_seconds: u32,
}

impl FlowState {
    /// Whether the structural invariants between fields hold
    ///
    /// `pending` is present exactly in the code-entry phases and `in_flight`
    /// is set exactly in the request phases.
    pub fn is_consistent(&self) -> bool {
        let pending_ok = self.pending.is_some() == self.phase.requires_pending();
        let in_flight_ok = self.in_flight == matches!(self.phase, Phase::Sending | Phase::Verifying);
        pending_ok && in_flight_ok
    }

    /// Whether the flow is back at its initial state
    pub fn is_pristine(&self) -> bool {
        self.phase == Phase::Idle
            && self.pending.is_none()
            && self.last_error.is_none()
            && !self.in_flight
            && self.cooldown_seconds == 0
    }

    /// Message of the last error, if any
    pub fn error_message(&self) -> Option<&str> {
        self.last_error.as_ref().map(|e| e.message.as_str())
    }
}
