//! Main login flow implementation

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Utc;
use otp_shared::phone::mask_phone_number;
use otp_shared::validation::{validate_mobile_number, validate_otp_code};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::entities::{AuthSession, Channel, PendingChallenge};
use crate::domain::value_objects::{ErrorInfo, FlowState, Notice, Phase};
use crate::errors::{FlowError, FlowResult, GatewayError, SessionStoreError};
use crate::services::gateway::{
    OtpGateway, SendCodeResult, VerifyCodeResult, RESEND_FAILURE_MESSAGE, SEND_FAILURE_MESSAGE,
};
use crate::services::session::SessionStore;

use super::config::FlowConfig;
use super::cooldown::CooldownTimer;

/// Notice for a first send when the backend sent no message
pub const SENT_MESSAGE: &str = "OTP sent successfully";

/// Notice for a resend when the backend sent no message
pub const RESENT_MESSAGE: &str = "OTP resent successfully";

/// Notice for a verification when the backend sent no message
pub const VERIFIED_MESSAGE: &str = "OTP verified successfully";

/// Error shown when a verification succeeds without a session token
pub const NO_USER_DATA_MESSAGE: &str = "No user data returned";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendKind {
    Initial,
    Resend,
}

/// Mutable state guarded by the flow's lock
#[derive(Default)]
struct FlowInner {
    state: FlowState,
    /// Challenge held aside while a resend is outstanding
    resend_origin: Option<PendingChallenge>,
    /// Bumped by `reset`; results of requests started before are dropped
    epoch: u64,
    /// Bumped whenever the cooldown restarts or stops; stale ticks are ignored
    cooldown_generation: u64,
}

struct FlowShared {
    inner: Mutex<FlowInner>,
    updates: watch::Sender<FlowState>,
}

impl FlowShared {
    fn lock(&self) -> MutexGuard<'_, FlowInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &FlowInner) {
        self.updates.send_replace(inner.state.clone());
    }

    fn apply_tick(&self, generation: u64, remaining: u32) {
        let mut inner = self.lock();
        if inner.cooldown_generation != generation || remaining >= inner.state.cooldown_seconds {
            return;
        }
        inner.state.cooldown_seconds = remaining;
        self.publish(&inner);
    }
}

/// OTP login flow for one user session
///
/// The flow is the single writer of its [`FlowState`]. Every operation
/// checks its guards and moves to the request phase inside one short
/// critical section, awaits the gateway without holding the lock, and then
/// applies the result exactly once. A second operation issued while a
/// request is outstanding is rejected with [`FlowError::AlreadyInProgress`].
///
/// Observers get every transition and cooldown tick through
/// [`OtpFlow::subscribe`].
pub struct OtpFlow<G: ?Sized, S: ?Sized> {
    gateway: Arc<G>,
    sessions: Arc<S>,
    config: FlowConfig,
    shared: Arc<FlowShared>,
    cooldown: CooldownTimer,
}

impl<G, S> OtpFlow<G, S>
where
    G: OtpGateway + ?Sized,
    S: SessionStore + ?Sized,
{
    /// Create a new login flow
    ///
    /// # Arguments
    ///
    /// * `gateway` - Backend that issues and checks codes
    /// * `sessions` - Slot the session token is written to
    /// * `config` - Flow configuration
    pub fn new(gateway: Arc<G>, sessions: Arc<S>, config: FlowConfig) -> Self {
        let (updates, _) = watch::channel(FlowState::default());
        let cooldown = CooldownTimer::new(config.tick);

        Self {
            gateway,
            sessions,
            config,
            shared: Arc::new(FlowShared {
                inner: Mutex::new(FlowInner::default()),
                updates,
            }),
            cooldown,
        }
    }

    /// Current state
    pub fn snapshot(&self) -> FlowState {
        self.shared.lock().state.clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<FlowState> {
        self.shared.updates.subscribe()
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.shared.lock().state.phase
    }

    /// Seconds until a resend is allowed
    pub fn cooldown_seconds(&self) -> u32 {
        self.shared.lock().state.cooldown_seconds
    }

    /// Whether `resend` would be accepted right now
    pub fn can_resend(&self) -> bool {
        let inner = self.shared.lock();
        inner.state.phase == Phase::AwaitingCode
            && !inner.state.in_flight
            && inner.state.cooldown_seconds == 0
    }

    /// Flow configuration
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Request a code for `mobile_number` over `channel`
    ///
    /// Only available from `Idle`. The number must be exactly ten digits;
    /// anything else fails locally without a network call. The resend
    /// cooldown starts as soon as the request is issued.
    ///
    /// # Returns
    ///
    /// * `Ok(Notice)` - Code issued; the flow is in `AwaitingCode`
    /// * `Err(FlowError)` - Local rejection, or the gateway error after the
    ///   flow returned to `Idle`
    pub async fn request_code(&self, mobile_number: &str, channel: Channel) -> FlowResult<Notice> {
        let epoch = {
            let mut inner = self.shared.lock();
            if inner.state.in_flight {
                return Err(FlowError::AlreadyInProgress);
            }
            if inner.state.phase != Phase::Idle {
                return Err(FlowError::InvalidPhase {
                    phase: inner.state.phase,
                    action: "request a code",
                });
            }
            validate_mobile_number(mobile_number)?;

            inner.state.phase = Phase::Sending;
            inner.state.in_flight = true;
            inner.state.pending = None;
            inner.state.last_error = None;
            inner.state.last_message = None;
            self.restart_cooldown(&mut inner);
            self.shared.publish(&inner);
            inner.epoch
        };

        info!(
            phone = %mask_phone_number(mobile_number),
            channel = %channel,
            gateway = self.gateway.gateway_name(),
            event = "otp_send_requested",
            "Requesting verification code"
        );

        let result = self.gateway.request_code(mobile_number, channel).await;
        self.finish_send(epoch, SendKind::Initial, mobile_number, channel, result)
    }

    /// Resend the code for the current challenge over `channel`
    ///
    /// Only available in `AwaitingCode` once the cooldown has reached zero.
    /// The cooldown restarts as soon as the request is issued. If the resend
    /// fails the previous challenge stays usable.
    pub async fn resend(&self, channel: Channel) -> FlowResult<Notice> {
        let (epoch, mobile_number) = {
            let mut inner = self.shared.lock();
            if inner.state.in_flight {
                return Err(FlowError::AlreadyInProgress);
            }
            match inner.state.phase {
                Phase::AwaitingCode => {}
                Phase::Idle => return Err(FlowError::NoPendingChallenge),
                phase => {
                    return Err(FlowError::InvalidPhase {
                        phase,
                        action: "resend a code",
                    })
                }
            }
            if inner.state.cooldown_seconds > 0 {
                return Err(FlowError::CooldownActive {
                    remaining: inner.state.cooldown_seconds,
                });
            }
            let origin = inner.state.pending.take().ok_or(FlowError::NoPendingChallenge)?;
            let mobile_number = origin.mobile_number.clone();

            inner.resend_origin = Some(origin);
            inner.state.phase = Phase::Sending;
            inner.state.in_flight = true;
            inner.state.last_error = None;
            inner.state.last_message = None;
            self.restart_cooldown(&mut inner);
            self.shared.publish(&inner);
            (inner.epoch, mobile_number)
        };

        info!(
            phone = %mask_phone_number(&mobile_number),
            channel = %channel,
            event = "otp_resend_requested",
            "Resending verification code"
        );

        let result = self.gateway.request_code(&mobile_number, channel).await;
        self.finish_send(epoch, SendKind::Resend, &mobile_number, channel, result)
    }

    /// Submit `code` for the pending challenge
    ///
    /// Fails locally with `NoPendingChallenge` when no code was issued and
    /// with a validation error unless the code is 4 to 6 digits. On success
    /// the session token is written to the session store.
    pub async fn verify_code(&self, code: &str) -> FlowResult<Notice> {
        let (epoch, challenge_id) = {
            let mut inner = self.shared.lock();
            if inner.state.in_flight {
                return Err(FlowError::AlreadyInProgress);
            }
            let challenge_id = match (inner.state.phase, inner.state.pending.as_ref()) {
                (Phase::AwaitingCode, Some(pending)) => pending.challenge_id.clone(),
                (_, None) => return Err(FlowError::NoPendingChallenge),
                (phase, Some(_)) => {
                    return Err(FlowError::InvalidPhase {
                        phase,
                        action: "verify a code",
                    })
                }
            };
            validate_otp_code(code)?;

            inner.state.phase = Phase::Verifying;
            inner.state.in_flight = true;
            inner.state.last_error = None;
            inner.state.last_message = None;
            self.shared.publish(&inner);
            (inner.epoch, challenge_id)
        };

        info!(
            challenge_id = %challenge_id,
            event = "otp_verify_requested",
            "Verifying code"
        );

        let result = self.gateway.verify_code(&challenge_id, code).await;
        let (outcome, session) = self.finish_verify(epoch, result);

        if let Some(session) = session {
            self.persist(&session).await;
        }

        outcome
    }

    /// Return to `Idle` from any phase
    ///
    /// Clears the challenge, errors and messages, stops the cooldown, and
    /// drops the result of any request still outstanding.
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        inner.epoch = inner.epoch.wrapping_add(1);
        inner.state = FlowState::default();
        inner.resend_origin = None;
        self.stop_cooldown(&mut inner);
        self.shared.publish(&inner);

        info!(event = "flow_reset", "Login flow reset");
    }

    /// Reset the flow and clear the stored session token
    pub async fn sign_out(&self) -> Result<(), SessionStoreError> {
        self.reset();
        self.sessions.clear_token().await.map_err(|e| {
            warn!(error = %e, event = "session_clear_failed", "Failed to clear session token");
            e
        })
    }

    fn finish_send(
        &self,
        epoch: u64,
        kind: SendKind,
        mobile_number: &str,
        channel: Channel,
        result: Result<SendCodeResult, GatewayError>,
    ) -> FlowResult<Notice> {
        let mut inner = self.shared.lock();
        if inner.epoch != epoch {
            debug!(event = "otp_send_superseded", "Dropping send result after reset");
            return Err(FlowError::Superseded);
        }
        inner.state.in_flight = false;

        let outcome = match result {
            Ok(sent) => {
                let fallback = match kind {
                    SendKind::Initial => SENT_MESSAGE,
                    SendKind::Resend => RESENT_MESSAGE,
                };
                let message = non_blank(sent.message, fallback);

                let challenge = match inner.resend_origin.take() {
                    Some(mut origin) if origin.challenge_id == sent.challenge_id => {
                        origin.issued_channel = channel;
                        origin
                    }
                    _ => PendingChallenge::new(sent.challenge_id, mobile_number, channel),
                };

                info!(
                    phone = %mask_phone_number(mobile_number),
                    channel = %channel,
                    challenge_id = %challenge.challenge_id,
                    resend = kind == SendKind::Resend,
                    event = "otp_sent",
                    "Verification code issued"
                );

                inner.state.pending = Some(challenge);
                inner.state.mobile_number = Some(mobile_number.to_string());
                inner.state.phase = Phase::AwaitingCode;
                inner.state.last_message = Some(message.clone());
                Ok(Notice::new(message))
            }
            Err(err) => {
                let err = match (kind, err) {
                    (SendKind::Resend, GatewayError::Rejected(message)) => {
                        GatewayError::Rejected(resend_rejection(message))
                    }
                    (_, err) => err,
                };
                warn!(
                    phone = %mask_phone_number(mobile_number),
                    error = %err,
                    kind = err.kind().code(),
                    event = "otp_send_failed",
                    "Failed to send verification code"
                );

                let err = FlowError::from(err);
                inner.state.last_error = Some(ErrorInfo::from(&err));
                match inner.resend_origin.take() {
                    Some(origin) => {
                        inner.state.pending = Some(origin);
                        inner.state.phase = Phase::AwaitingCode;
                    }
                    None => {
                        inner.state.pending = None;
                        inner.state.phase = Phase::Idle;
                    }
                }
                Err(err)
            }
        };

        self.shared.publish(&inner);
        outcome
    }

    fn finish_verify(
        &self,
        epoch: u64,
        result: Result<VerifyCodeResult, GatewayError>,
    ) -> (FlowResult<Notice>, Option<AuthSession>) {
        let mut inner = self.shared.lock();
        if inner.epoch != epoch {
            debug!(event = "otp_verify_superseded", "Dropping verify result after reset");
            return (Err(FlowError::Superseded), None);
        }
        inner.state.in_flight = false;

        let outcome = match result {
            Ok(verified) => {
                let token = verified
                    .user
                    .as_ref()
                    .and_then(|user| user.session_token())
                    .map(str::to_string);

                match token {
                    Some(token) => {
                        let session =
                            AuthSession::issued_at(token, Utc::now(), self.config.session_ttl_days);
                        let message = non_blank(verified.message, VERIFIED_MESSAGE);

                        info!(
                            user_id = verified.user.as_ref().and_then(|u| u.id.as_deref()).unwrap_or("-"),
                            event = "otp_verified",
                            "Verification succeeded"
                        );

                        inner.state.phase = Phase::Authenticated;
                        inner.state.pending = None;
                        inner.state.user = verified.user;
                        inner.state.last_message = Some(message.clone());
                        self.stop_cooldown(&mut inner);
                        (Ok(Notice::new(message)), Some(session))
                    }
                    None => {
                        warn!(
                            event = "otp_verify_no_session",
                            "Verification succeeded without a session token"
                        );

                        let err = FlowError::NoSessionIssued(NO_USER_DATA_MESSAGE.to_string());
                        inner.state.phase = Phase::AwaitingCode;
                        inner.state.last_error = Some(ErrorInfo::from(&err));
                        (Err(err), None)
                    }
                }
            }
            Err(err) => {
                let max_attempts = self.config.max_verify_attempts;
                let exhausted = match (&err, inner.state.pending.as_mut()) {
                    (GatewayError::Rejected(_), Some(pending)) => {
                        pending.record_rejection();
                        pending.attempts_exhausted(max_attempts)
                    }
                    _ => false,
                };

                warn!(
                    error = %err,
                    kind = err.kind().code(),
                    exhausted,
                    event = "otp_verify_failed",
                    "Verification failed"
                );

                let err = FlowError::from(err);
                inner.state.last_error = Some(ErrorInfo::from(&err));
                if exhausted {
                    inner.state.phase = Phase::Failed;
                    inner.state.pending = None;
                    self.stop_cooldown(&mut inner);
                } else {
                    inner.state.phase = Phase::AwaitingCode;
                }
                (Err(err), None)
            }
        };

        self.shared.publish(&inner);
        outcome
    }

    async fn persist(&self, session: &AuthSession) {
        match self.sessions.store_token(session).await {
            Ok(()) => debug!(
                expires_at = %session.expires_at,
                event = "session_persisted",
                "Session token stored"
            ),
            Err(e) => warn!(
                error = %e,
                event = "session_persist_failed",
                "Failed to store session token"
            ),
        }
    }

    fn restart_cooldown(&self, inner: &mut FlowInner) {
        inner.cooldown_generation = inner.cooldown_generation.wrapping_add(1);
        inner.state.cooldown_seconds = self.config.cooldown_seconds;

        if self.config.cooldown_seconds == 0 {
            self.cooldown.cancel();
            return;
        }

        let generation = inner.cooldown_generation;
        let shared: Weak<FlowShared> = Arc::downgrade(&self.shared);
        self.cooldown.start(self.config.cooldown_seconds, move |remaining| {
            if let Some(shared) = shared.upgrade() {
                shared.apply_tick(generation, remaining);
            }
        });
    }

    fn stop_cooldown(&self, inner: &mut FlowInner) {
        inner.cooldown_generation = inner.cooldown_generation.wrapping_add(1);
        inner.state.cooldown_seconds = 0;
        self.cooldown.cancel();
    }
}

fn non_blank(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

// The gateway only knows it was a send; its generic fallback is reworded here
fn resend_rejection(message: String) -> String {
    if message == SEND_FAILURE_MESSAGE {
        RESEND_FAILURE_MESSAGE.to_string()
    } else {
        non_blank(message, RESEND_FAILURE_MESSAGE)
    }
}
