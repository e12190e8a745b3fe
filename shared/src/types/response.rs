//! Wire envelope shared by the OTP endpoints

use serde::{Deserialize, Serialize};

/// Response envelope returned by both login endpoints
///
/// ```json
/// { "success": true, "message": "OTP sent", "data": { "otpId": "abc123" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the backend accepted the request
    pub success: bool,

    /// Human-readable message, present on success and failure
    #[serde(default)]
    pub message: String,

    /// Payload, `null` on failure
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Create a successful envelope
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create a failure envelope
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Message if the backend sent a non-blank one
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        let trimmed = self.message.trim();
        if trimmed.is_empty() {
            fallback
        } else {
            trimmed
        }
    }

    /// Extract the data, consuming the envelope
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}
