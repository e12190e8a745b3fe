//! Types for gateway results

use crate::domain::entities::UserRecord;

/// Fallback message when the backend refuses a send without explanation
pub const SEND_FAILURE_MESSAGE: &str = "Failed to send OTP";

/// Shown instead of [`SEND_FAILURE_MESSAGE`] when the refused send was a resend
pub const RESEND_FAILURE_MESSAGE: &str = "Failed to resend OTP";

/// Fallback message when the backend refuses a verification without explanation
pub const VERIFY_FAILURE_MESSAGE: &str = "OTP verification failed";

/// Generic message for transport-level failures
pub const UNREACHABLE_MESSAGE: &str = "Something went wrong";

/// Result of a successful send-code call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCodeResult {
    /// Handle of the new challenge
    pub challenge_id: String,
    /// Backend message
    pub message: String,
}

/// Result of a successful verify-code call
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyCodeResult {
    /// User echoed by the backend; may be absent or lack a token
    pub user: Option<UserRecord>,
    /// Backend message
    pub message: String,
}
