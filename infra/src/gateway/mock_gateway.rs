//! Mock OTP gateway for development
//!
//! Plays the backend in-process: issues challenge ids, generates a code and
//! logs it instead of delivering it, then checks submitted codes against it.

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use otp_core::errors::GatewayError;
use otp_core::services::gateway::UNREACHABLE_MESSAGE;
use otp_core::{Channel, OtpGateway, SendCodeResult, UserRecord, VerifyCodeResult};
use otp_shared::phone::mask_phone_number;

/// Challenge issued by the mock backend
#[derive(Debug, Clone)]
struct IssuedCode {
    mobile_number: String,
    code: String,
}

/// In-process OTP backend
///
/// This implementation:
/// - Generates a random 6-digit code per challenge and logs it
/// - Accepts the code once, then forgets the challenge
/// - Keeps only the latest challenge per number
/// - Issues a random access token on success
/// - Can simulate an unreachable backend
pub struct MockOtpGateway {
    issued: Mutex<HashMap<String, IssuedCode>>,
    sent_count: AtomicU64,
    simulate_failure: AtomicBool,
}

impl MockOtpGateway {
    /// Create a new mock gateway
    pub fn new() -> Self {
        Self {
            issued: Mutex::new(HashMap::new()),
            sent_count: AtomicU64::new(0),
            simulate_failure: AtomicBool::new(false),
        }
    }

    /// Number of codes issued so far
    pub fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::SeqCst)
    }

    /// Make every following call fail as unreachable
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    /// Number of challenges still outstanding
    pub async fn outstanding(&self) -> usize {
        self.issued.lock().await.len()
    }

    /// Code issued for `challenge_id`, if still outstanding
    pub async fn issued_code(&self, challenge_id: &str) -> Option<String> {
        self.issued
            .lock()
            .await
            .get(challenge_id)
            .map(|issued| issued.code.clone())
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(provider = "mock", "Mock gateway simulating unreachable backend");
            return Err(GatewayError::Unreachable(UNREACHABLE_MESSAGE.to_string()));
        }
        Ok(())
    }
}

impl Default for MockOtpGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

#[async_trait]
impl OtpGateway for MockOtpGateway {
    async fn request_code(
        &self,
        mobile_number: &str,
        channel: Channel,
    ) -> Result<SendCodeResult, GatewayError> {
        self.check_available()?;

        let challenge_id = Uuid::new_v4().to_string();
        let code = generate_code();

        {
            let mut issued = self.issued.lock().await;
            // A new code supersedes any earlier one for the same number
            issued.retain(|_, earlier| earlier.mobile_number != mobile_number);
            issued.insert(
                challenge_id.clone(),
                IssuedCode {
                    mobile_number: mobile_number.to_string(),
                    code: code.clone(),
                },
            );
        }
        let count = self.sent_count.fetch_add(1, Ordering::SeqCst) + 1;

        // Dev only: the code goes to the log instead of a phone
        info!(
            provider = "mock",
            phone = %mask_phone_number(mobile_number),
            channel = %channel,
            challenge_id = %challenge_id,
            code = %code,
            count,
            "Mock OTP issued"
        );

        Ok(SendCodeResult {
            challenge_id,
            message: format!("OTP sent via {}", channel.display_name()),
        })
    }

    async fn verify_code(
        &self,
        challenge_id: &str,
        code: &str,
    ) -> Result<VerifyCodeResult, GatewayError> {
        self.check_available()?;

        let mut issued = self.issued.lock().await;
        let expected = issued
            .get(challenge_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected("OTP expired or not found".to_string()))?;

        if expected.code != code {
            return Err(GatewayError::Rejected("Invalid OTP".to_string()));
        }
        issued.remove(challenge_id);

        let mut user = UserRecord::with_token(Uuid::new_v4().to_string());
        user.id = Some(Uuid::new_v4().simple().to_string());
        user.mobile_number = Some(expected.mobile_number.clone());
        user.extra
            .insert("provider".to_string(), Value::String("mock".to_string()));

        info!(
            provider = "mock",
            phone = %mask_phone_number(&expected.mobile_number),
            "Mock OTP verified"
        );

        Ok(VerifyCodeResult {
            user: Some(user),
            message: "OTP verified successfully".to_string(),
        })
    }

    fn gateway_name(&self) -> &str {
        "mock"
    }
}
