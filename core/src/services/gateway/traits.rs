//! Trait for OTP backend integration

use async_trait::async_trait;

use crate::domain::entities::Channel;
use crate::errors::GatewayError;

use super::types::{SendCodeResult, VerifyCodeResult};

/// Backend that issues and checks one-time codes
///
/// Both calls may have side effects on the backend (a new delivery, a
/// consumed code), so neither is retried by implementations.
#[async_trait]
pub trait OtpGateway: Send + Sync {
    /// Ask the backend to deliver a code to `mobile_number` over `channel`
    ///
    /// The number is expected to be validated by the caller.
    async fn request_code(
        &self,
        mobile_number: &str,
        channel: Channel,
    ) -> Result<SendCodeResult, GatewayError>;

    /// Submit `code` for the challenge identified by `challenge_id`
    async fn verify_code(
        &self,
        challenge_id: &str,
        code: &str,
    ) -> Result<VerifyCodeResult, GatewayError>;

    /// Name of the backing implementation, for logs
    fn gateway_name(&self) -> &str {
        "otp-gateway"
    }
}
