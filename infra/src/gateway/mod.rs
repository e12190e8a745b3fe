//! OTP gateway implementations
//!
//! - `HttpOtpGateway`: the real backend over JSON/HTTP
//! - `MockOtpGateway`: in-process backend that logs codes instead of sending them

pub mod http_gateway;
pub mod mock_gateway;


pub use http_gateway::{HttpOtpGateway, MALFORMED_RESPONSE_MESSAGE};
pub use mock_gateway::MockOtpGateway;

use std::sync::Arc;

use otp_core::OtpGateway;
use otp_shared::config::{GatewayConfig, GatewayMode};

use crate::InfrastructureError;

/// Create the gateway selected by the configuration
pub fn create_gateway(config: &GatewayConfig) -> Result<Arc<dyn OtpGateway>, InfrastructureError> {
    match config.mode {
        GatewayMode::Http => {
            let gateway = HttpOtpGateway::from_config(config)?;
            tracing::info!(
                base_url = %gateway.base_url(),
                timeout_secs = config.request_timeout_secs,
                "Using HTTP OTP gateway"
            );
            Ok(Arc::new(gateway))
        }
        GatewayMode::Mock => {
            tracing::warn!("Using mock OTP gateway; codes are logged, not delivered");
            Ok(Arc::new(MockOtpGateway::new()))
        }
    }
}
