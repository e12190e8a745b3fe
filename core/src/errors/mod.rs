//! Error taxonomy of the login flow.

mod types;


pub use types::{ErrorKind, GatewayError, SessionStoreError};

use otp_shared::validation::ValidationError;
use thiserror::Error;

use crate::domain::value_objects::Phase;

/// Errors returned by login flow operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Malformed local input; never reaches the network
    #[error("{message}")]
    Validation { field: String, message: String },

    /// Another request of this flow is still outstanding
    #[error("A request is already in progress")]
    AlreadyInProgress,

    /// Verification attempted before any code was issued
    #[error("No OTP has been requested yet")]
    NoPendingChallenge,

    /// Resend attempted before the cooldown elapsed
    #[error("Please wait {remaining} seconds before requesting a new code")]
    CooldownActive { remaining: u32 },

    /// Action not available in the current phase
    #[error("Cannot {action} while {phase}")]
    InvalidPhase { phase: Phase, action: &'static str },

    /// A reset happened while the request was outstanding; its result was dropped
    #[error("The request was cancelled by a reset")]
    Superseded,

    /// Backend refusal or transport failure
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Verification succeeded without a usable session token
    #[error("{0}")]
    NoSessionIssued(String),
}

impl FlowError {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowError::Validation { .. } => ErrorKind::Validation,
            FlowError::AlreadyInProgress => ErrorKind::AlreadyInProgress,
            FlowError::NoPendingChallenge => ErrorKind::NoPendingChallenge,
            FlowError::CooldownActive { .. } => ErrorKind::CooldownActive,
            FlowError::InvalidPhase { .. } => ErrorKind::InvalidPhase,
            FlowError::Superseded => ErrorKind::Superseded,
            FlowError::Gateway(err) => err.kind(),
            FlowError::NoSessionIssued(_) => ErrorKind::NoSessionIssued,
        }
    }

    /// Whether the error was raised without contacting the backend
    pub fn is_local(&self) -> bool {
        self.kind().is_local()
    }
}

impl From<ValidationError> for FlowError {
    fn from(err: ValidationError) -> Self {
        FlowError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

pub type FlowResult<T> = Result<T, FlowError>;
