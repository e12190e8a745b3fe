//! HTTP OTP gateway
//!
//! Translates the two login operations into calls against the backend:
//!
//! - `POST {base}/api/login/send-otp` with `{ "mobileNumber", "via" }`
//! - `POST {base}/api/login/verify-otp` with `{ "otpId", "otp" }`
//!
//! Both endpoints answer with the shared `{ success, message, data }`
//! envelope. Every failure is normalized into a `GatewayError` here so the
//! login flow never sees transport details.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use otp_core::errors::GatewayError;
use otp_core::services::gateway::{
    SEND_FAILURE_MESSAGE, UNREACHABLE_MESSAGE, VERIFY_FAILURE_MESSAGE,
};
use otp_core::{Channel, OtpGateway, SendCodeResult, UserRecord, VerifyCodeResult};
use otp_shared::config::{GatewayConfig, SEND_OTP_PATH, VERIFY_OTP_PATH};
use otp_shared::phone::mask_phone_number;
use otp_shared::ApiEnvelope;

use crate::http::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};
use crate::InfrastructureError;

/// Message for a success envelope without the expected payload
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Malformed response from server";

/// Gateway talking to the OTP backend over HTTP
pub struct HttpOtpGateway<T = ReqwestTransport> {
    transport: T,
    base_url: String,
}

impl HttpOtpGateway<ReqwestTransport> {
    /// Create a gateway from configuration
    ///
    /// Fails if no base URL is configured.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, InfrastructureError> {
        let base_url = config.normalized_base_url().ok_or_else(|| {
            InfrastructureError::Config("Backend base URL is not set".to_string())
        })?;
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))?;

        Ok(Self::with_transport(base_url, transport))
    }
}

impl<T: HttpTransport> HttpOtpGateway<T> {
    /// Create a gateway over an explicit transport
    pub fn with_transport(base_url: impl Into<String>, transport: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { transport, base_url }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl<T: HttpTransport> OtpGateway for HttpOtpGateway<T> {
    async fn request_code(
        &self,
        mobile_number: &str,
        channel: Channel,
    ) -> Result<SendCodeResult, GatewayError> {
        let body = json!({
            "mobileNumber": mobile_number,
            "via": channel.as_wire(),
        });

        debug!(
            phone = %mask_phone_number(mobile_number),
            channel = %channel,
            "Sending send-otp request"
        );

        let outcome = self.transport.post_json(&self.endpoint(SEND_OTP_PATH), &body).await;
        let envelope = interpret(outcome, SEND_FAILURE_MESSAGE, "send-otp")?;

        let challenge_id = envelope
            .data
            .as_ref()
            .and_then(|data| data.get("otpId"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                warn!(operation = "send-otp", "Success response without otpId");
                GatewayError::Unreachable(MALFORMED_RESPONSE_MESSAGE.to_string())
            })?;

        Ok(SendCodeResult {
            challenge_id,
            message: envelope.message,
        })
    }

    async fn verify_code(
        &self,
        challenge_id: &str,
        code: &str,
    ) -> Result<VerifyCodeResult, GatewayError> {
        let body = json!({
            "otpId": challenge_id,
            "otp": code,
        });

        debug!(challenge_id = %challenge_id, "Sending verify-otp request");

        let outcome = self.transport.post_json(&self.endpoint(VERIFY_OTP_PATH), &body).await;
        let envelope = interpret(outcome, VERIFY_FAILURE_MESSAGE, "verify-otp")?;

        let user = envelope
            .data
            .as_ref()
            .and_then(|data| data.get("user"))
            .filter(|user| user.is_object())
            .and_then(|user| match serde_json::from_value::<UserRecord>(user.clone()) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(operation = "verify-otp", error = %e, "Unreadable user in verify response");
                    None
                }
            });

        Ok(VerifyCodeResult {
            user,
            message: envelope.message,
        })
    }

    fn gateway_name(&self) -> &str {
        "http"
    }
}

/// Normalize a raw exchange into a success envelope or a `GatewayError`
///
/// - `success: false` in any status: `Rejected` with the backend message,
///   or `fallback` when it is blank
/// - `success: true` with a 2xx status: the envelope
/// - anything else (no status, no JSON, no envelope): `Unreachable`
fn interpret(
    outcome: Result<TransportResponse, TransportError>,
    fallback: &str,
    operation: &str,
) -> Result<ApiEnvelope<Value>, GatewayError> {
    let response = outcome.map_err(|e| {
        warn!(operation, error = %e, event = "gateway_transport_failed", "Backend unreachable");
        unreachable_error()
    })?;

    let envelope = response
        .body
        .clone()
        .and_then(|body| serde_json::from_value::<ApiEnvelope<Value>>(body).ok());

    match envelope {
        Some(envelope) if !envelope.success => {
            let message = envelope.message_or(fallback).to_string();
            debug!(
                operation,
                status = response.status,
                message = %message,
                "Backend rejected request"
            );
            Err(GatewayError::Rejected(message))
        }
        Some(envelope) if response.is_success() => Ok(envelope),
        _ => {
            warn!(
                operation,
                status = response.status,
                event = "gateway_bad_response",
                "Backend returned no usable envelope"
            );
            Err(unreachable_error())
        }
    }
}

fn unreachable_error() -> GatewayError {
    GatewayError::Unreachable(UNREACHABLE_MESSAGE.to_string())
}
