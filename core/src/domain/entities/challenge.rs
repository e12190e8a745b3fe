//! Outstanding OTP challenge and its delivery channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery medium for a one-time code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Channel {
    /// Plain text message
    #[serde(rename = "sms")]
    Sms,
    /// Messaging-app message
    #[default]
    #[serde(rename = "whatsapp")]
    MessagingApp,
}

impl Channel {
    /// Label sent as `via` in the send-code request
    pub fn as_wire(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::MessagingApp => "whatsapp",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Channel::Sms => "SMS",
            Channel::MessagingApp => "WhatsApp",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sms" => Ok(Channel::Sms),
            "whatsapp" | "messaging-app" | "messaging_app" => Ok(Channel::MessagingApp),
            _ => Err(format!("Invalid delivery channel: {}", s)),
        }
    }
}

/// One outstanding OTP challenge issued by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChallenge {
    /// Backend-assigned handle for the code
    pub challenge_id: String,

    /// Number the challenge was issued for
    pub mobile_number: String,

    /// Channel most recently used to deliver the code
    pub issued_channel: Channel,

    /// When the client received the challenge
    pub issued_at: DateTime<Utc>,

    /// Verifications the backend has rejected for this challenge
    pub verify_attempts: u32,
}

impl PendingChallenge {
    /// Creates a challenge issued now
    pub fn new(
        challenge_id: impl Into<String>,
        mobile_number: impl Into<String>,
        issued_channel: Channel,
    ) -> Self {
        Self {
            challenge_id: challenge_id.into(),
            mobile_number: mobile_number.into(),
            issued_channel,
            issued_at: Utc::now(),
            verify_attempts: 0,
        }
    }

    /// Records a rejected verification and returns the new count
    pub fn record_rejection(&mut self) -> u32 {
        self.verify_attempts = self.verify_attempts.saturating_add(1);
        self.verify_attempts
    }

    /// Whether `max_attempts` rejections have been used up
    pub fn attempts_exhausted(&self, max_attempts: u32) -> bool {
        self.verify_attempts >= max_attempts
    }
}
