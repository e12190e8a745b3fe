use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use super::mocks::{rejected, sent, unreachable, verified, MockGateway, MockSessionStore};
use crate::domain::entities::{Channel, UserRecord};
use crate::domain::value_objects::Phase;
use crate::errors::{ErrorKind, FlowError, GatewayError};
use crate::services::flow::{FlowConfig, OtpFlow, NO_USER_DATA_MESSAGE, RESENT_MESSAGE, SENT_MESSAGE};
use crate::services::gateway::{VerifyCodeResult, RESEND_FAILURE_MESSAGE, SEND_FAILURE_MESSAGE};

const MOBILE: &str = "9876543210";

type TestFlow = OtpFlow<MockGateway, MockSessionStore>;

// Cooldown long enough that no tick lands during a test
fn quiet_config() -> FlowConfig {
    FlowConfig {
        tick: Duration::from_secs(3600),
        ..Default::default()
    }
}

// No cooldown, so resends are accepted immediately
fn no_cooldown_config() -> FlowConfig {
    FlowConfig {
        cooldown_seconds: 0,
        ..quiet_config()
    }
}

fn build(config: FlowConfig) -> (TestFlow, Arc<MockGateway>, Arc<MockSessionStore>) {
    build_with(MockGateway::new(), MockSessionStore::new(false), config)
}

fn build_with(
    gateway: MockGateway,
    store: MockSessionStore,
    config: FlowConfig,
) -> (TestFlow, Arc<MockGateway>, Arc<MockSessionStore>) {
    let gateway = Arc::new(gateway);
    let store = Arc::new(store);
    let flow = OtpFlow::new(gateway.clone(), store.clone(), config);
    (flow, gateway, store)
}

#[tokio::test]
async fn test_request_code_moves_to_awaiting_code() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));

    let notice = flow.request_code(MOBILE, Channel::MessagingApp).await.unwrap();

    assert_eq!(notice.message, "sent");
    let state = flow.snapshot();
    assert_eq!(state.phase, Phase::AwaitingCode);
    assert_eq!(state.pending.as_ref().unwrap().challenge_id, "abc123");
    assert_eq!(state.pending.as_ref().unwrap().issued_channel, Channel::MessagingApp);
    assert_eq!(state.mobile_number.as_deref(), Some(MOBILE));
    assert_eq!(state.cooldown_seconds, 30);
    assert_eq!(state.last_message.as_deref(), Some("sent"));
    assert!(!state.in_flight);
    assert!(state.is_consistent());

    let calls = gateway.send_calls.lock().unwrap().clone();
    assert_eq!(calls, vec![(MOBILE.to_string(), Channel::MessagingApp)]);
}

#[tokio::test]
async fn test_request_code_blank_message_uses_fallback() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(sent("abc123", "  "));

    let notice = flow.request_code(MOBILE, Channel::Sms).await.unwrap();

    assert_eq!(notice.message, SENT_MESSAGE);
}

#[tokio::test]
async fn test_verify_success_authenticates_and_persists_token() {
    let (flow, gateway, store) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_verify(verified("tok"));

    flow.request_code(MOBILE, Channel::MessagingApp).await.unwrap();
    flow.verify_code("1234").await.unwrap();

    let state = flow.snapshot();
    assert_eq!(state.phase, Phase::Authenticated);
    assert!(state.pending.is_none());
    assert_eq!(state.cooldown_seconds, 0);
    assert_eq!(
        state.user.as_ref().and_then(|u| u.session_token()),
        Some("tok")
    );
    assert!(state.is_consistent());
    assert_eq!(store.tokens(), vec!["tok".to_string()]);

    let calls = gateway.verify_calls.lock().unwrap().clone();
    assert_eq!(calls, vec![("abc123".to_string(), "1234".to_string())]);
}

#[tokio::test]
async fn test_verify_rejection_keeps_challenge() {
    let (flow, gateway, store) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_verify(Err(rejected("Invalid OTP")));

    flow.request_code(MOBILE, Channel::MessagingApp).await.unwrap();
    let err = flow.verify_code("0000").await.unwrap_err();

    assert_eq!(err, FlowError::Gateway(rejected("Invalid OTP")));
    let state = flow.snapshot();
    assert_eq!(state.phase, Phase::AwaitingCode);
    assert_eq!(state.error_message(), Some("Invalid OTP"));
    assert_eq!(state.last_error.as_ref().unwrap().kind, ErrorKind::Rejected);
    let pending = state.pending.as_ref().unwrap();
    assert_eq!(pending.challenge_id, "abc123");
    assert_eq!(pending.verify_attempts, 1);
    assert!(store.tokens().is_empty());
}

#[tokio::test]
async fn test_verify_without_request_fails_locally() {
    let (flow, gateway, _) = build(quiet_config());

    let err = flow.verify_code("1234").await.unwrap_err();

    assert_eq!(err, FlowError::NoPendingChallenge);
    assert_eq!(gateway.verify_count(), 0);
    assert!(flow.snapshot().is_pristine());
}

#[tokio::test]
async fn test_second_request_while_in_flight_is_rejected() {
    let gate = Arc::new(Notify::new());
    let (flow, gateway, _) = build_with(
        MockGateway::gated(gate.clone()),
        MockSessionStore::new(false),
        quiet_config(),
    );
    let flow = Arc::new(flow);
    let mut updates = flow.subscribe();

    let first = {
        let flow = flow.clone();
        tokio::spawn(async move { flow.request_code(MOBILE, Channel::Sms).await })
    };
    updates.wait_for(|state| state.in_flight).await.unwrap();

    let err = flow.request_code(MOBILE, Channel::Sms).await.unwrap_err();
    assert_eq!(err, FlowError::AlreadyInProgress);
    assert_eq!(flow.phase(), Phase::Sending);

    let err = flow.verify_code("1234").await.unwrap_err();
    assert_eq!(err, FlowError::AlreadyInProgress);

    gate.notify_one();
    first.await.unwrap().unwrap();

    assert_eq!(flow.phase(), Phase::AwaitingCode);
    assert_eq!(gateway.send_count(), 1);
}

#[tokio::test]
async fn test_invalid_mobile_number_never_reaches_gateway() {
    let (flow, gateway, _) = build(quiet_config());

    for input in ["98765", "98765432101", "98765abcde", ""] {
        let err = flow.request_code(input, Channel::Sms).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Please enter a valid 10-digit mobile number");
    }

    assert_eq!(gateway.send_count(), 0);
    assert!(flow.snapshot().is_pristine());
}

#[tokio::test]
async fn test_invalid_code_never_reaches_gateway() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    flow.request_code(MOBILE, Channel::Sms).await.unwrap();

    for code in ["123", "1234567", "12a4", ""] {
        let err = flow.verify_code(code).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    assert_eq!(gateway.verify_count(), 0);
    let state = flow.snapshot();
    assert_eq!(state.phase, Phase::AwaitingCode);
    assert_eq!(state.pending.as_ref().unwrap().verify_attempts, 0);
}

#[tokio::test]
async fn test_send_failure_returns_to_idle() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(Err(rejected("Too many requests")));

    let err = flow.request_code(MOBILE, Channel::Sms).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Rejected);
    let state = flow.snapshot();
    assert_eq!(state.phase, Phase::Idle);
    assert!(state.pending.is_none());
    assert_eq!(state.error_message(), Some("Too many requests"));
    assert!(state.is_consistent());
}

#[tokio::test]
async fn test_next_request_clears_previous_error() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(Err(unreachable()));
    gateway.push_send(sent("abc123", "sent"));

    flow.request_code(MOBILE, Channel::Sms).await.unwrap_err();
    assert!(flow.snapshot().last_error.is_some());

    flow.request_code(MOBILE, Channel::Sms).await.unwrap();
    assert!(flow.snapshot().last_error.is_none());
}

#[tokio::test]
async fn test_request_code_outside_idle_is_invalid() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    flow.request_code(MOBILE, Channel::Sms).await.unwrap();

    let err = flow.request_code(MOBILE, Channel::Sms).await.unwrap_err();

    assert!(matches!(
        err,
        FlowError::InvalidPhase {
            phase: Phase::AwaitingCode,
            ..
        }
    ));
    assert_eq!(gateway.send_count(), 1);
}

#[tokio::test]
async fn test_verify_unreachable_does_not_count_attempt() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_verify(Err(unreachable()));

    flow.request_code(MOBILE, Channel::Sms).await.unwrap();
    let err = flow.verify_code("1234").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unreachable);
    let state = flow.snapshot();
    assert_eq!(state.phase, Phase::AwaitingCode);
    assert_eq!(state.pending.as_ref().unwrap().verify_attempts, 0);
    assert_eq!(state.error_message(), Some("Something went wrong"));
}

#[tokio::test]
async fn test_verify_without_token_reports_no_session() {
    let (flow, gateway, store) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_verify(Ok(VerifyCodeResult {
        user: Some(UserRecord::default()),
        message: "OTP verified successfully".to_string(),
    }));

    flow.request_code(MOBILE, Channel::Sms).await.unwrap();
    let err = flow.verify_code("1234").await.unwrap_err();

    assert_eq!(err, FlowError::NoSessionIssued(NO_USER_DATA_MESSAGE.to_string()));
    let state = flow.snapshot();
    assert_eq!(state.phase, Phase::AwaitingCode);
    assert!(state.pending.is_some());
    assert!(state.user.is_none());
    assert_eq!(state.error_message(), Some(NO_USER_DATA_MESSAGE));
    assert!(store.tokens().is_empty());
}

#[tokio::test]
async fn test_attempt_ceiling_fails_flow() {
    let config = FlowConfig {
        max_verify_attempts: 2,
        ..quiet_config()
    };
    let (flow, gateway, _) = build(config);
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_verify(Err(rejected("Invalid OTP")));
    gateway.push_verify(Err(rejected("Invalid OTP")));

    flow.request_code(MOBILE, Channel::Sms).await.unwrap();
    flow.verify_code("0000").await.unwrap_err();
    assert_eq!(flow.phase(), Phase::AwaitingCode);

    flow.verify_code("1111").await.unwrap_err();
    let state = flow.snapshot();
    assert_eq!(state.phase, Phase::Failed);
    assert!(state.pending.is_none());
    assert_eq!(state.cooldown_seconds, 0);
    assert_eq!(state.error_message(), Some("Invalid OTP"));
    assert!(state.is_consistent());

    assert_eq!(flow.verify_code("1234").await.unwrap_err(), FlowError::NoPendingChallenge);
    assert!(matches!(
        flow.request_code(MOBILE, Channel::Sms).await.unwrap_err(),
        FlowError::InvalidPhase {
            phase: Phase::Failed,
            ..
        }
    ));
    assert!(matches!(
        flow.resend(Channel::Sms).await.unwrap_err(),
        FlowError::InvalidPhase { .. }
    ));

    flow.reset();
    assert!(flow.snapshot().is_pristine());
    assert_eq!(gateway.verify_count(), 2);
}

#[tokio::test]
async fn test_resend_replaces_challenge() {
    let (flow, gateway, _) = build(no_cooldown_config());
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_send(sent("def456", ""));
    gateway.push_verify(Err(rejected("Invalid OTP")));

    flow.request_code(MOBILE, Channel::MessagingApp).await.unwrap();
    flow.verify_code("0000").await.unwrap_err();
    let notice = flow.resend(Channel::Sms).await.unwrap();

    assert_eq!(notice.message, RESENT_MESSAGE);
    let state = flow.snapshot();
    assert_eq!(state.phase, Phase::AwaitingCode);
    let pending = state.pending.as_ref().unwrap();
    assert_eq!(pending.challenge_id, "def456");
    assert_eq!(pending.issued_channel, Channel::Sms);
    assert_eq!(pending.verify_attempts, 0);

    let calls = gateway.send_calls.lock().unwrap().clone();
    assert_eq!(calls[1], (MOBILE.to_string(), Channel::Sms));
}

#[tokio::test]
async fn test_resend_with_same_challenge_keeps_attempts() {
    let (flow, gateway, _) = build(no_cooldown_config());
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_send(sent("abc123", "resent"));
    gateway.push_verify(Err(rejected("Invalid OTP")));

    flow.request_code(MOBILE, Channel::MessagingApp).await.unwrap();
    flow.verify_code("0000").await.unwrap_err();
    flow.resend(Channel::Sms).await.unwrap();

    let pending = flow.snapshot().pending.unwrap();
    assert_eq!(pending.challenge_id, "abc123");
    assert_eq!(pending.issued_channel, Channel::Sms);
    assert_eq!(pending.verify_attempts, 1);
}

#[tokio::test]
async fn test_resend_failure_restores_previous_challenge() {
    let (flow, gateway, _) = build(no_cooldown_config());
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_send(Err(unreachable()));
    gateway.push_verify(verified("tok"));

    flow.request_code(MOBILE, Channel::Sms).await.unwrap();
    let err = flow.resend(Channel::Sms).await.unwrap_err();

    assert_eq!(err, FlowError::Gateway(unreachable()));
    let state = flow.snapshot();
    assert_eq!(state.phase, Phase::AwaitingCode);
    assert_eq!(state.pending.as_ref().unwrap().challenge_id, "abc123");
    assert_eq!(state.error_message(), Some("Something went wrong"));
    assert!(state.is_consistent());

    flow.verify_code("1234").await.unwrap();
    let calls = gateway.verify_calls.lock().unwrap().clone();
    assert_eq!(calls[0].0, "abc123");
}

#[tokio::test]
async fn test_resend_refusal_without_explanation_mentions_resend() {
    let (flow, gateway, _) = build(no_cooldown_config());
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_send(Err(rejected(SEND_FAILURE_MESSAGE)));
    gateway.push_send(Err(rejected(" ")));
    gateway.push_send(Err(rejected("Too many requests")));

    flow.request_code(MOBILE, Channel::Sms).await.unwrap();

    let err = flow.resend(Channel::Sms).await.unwrap_err();
    assert_eq!(err, FlowError::Gateway(rejected(RESEND_FAILURE_MESSAGE)));
    assert_eq!(flow.snapshot().error_message(), Some(RESEND_FAILURE_MESSAGE));

    let err = flow.resend(Channel::MessagingApp).await.unwrap_err();
    assert_eq!(err.to_string(), RESEND_FAILURE_MESSAGE);

    let err = flow.resend(Channel::Sms).await.unwrap_err();
    assert_eq!(err.to_string(), "Too many requests");
    assert_eq!(flow.snapshot().pending.unwrap().challenge_id, "abc123");
}

#[tokio::test]
async fn test_first_send_refusal_keeps_send_wording() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(Err(rejected(SEND_FAILURE_MESSAGE)));

    let err = flow.request_code(MOBILE, Channel::Sms).await.unwrap_err();

    assert_eq!(err.to_string(), SEND_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_resend_requires_pending_challenge() {
    let (flow, gateway, _) = build(no_cooldown_config());

    let err = flow.resend(Channel::Sms).await.unwrap_err();

    assert_eq!(err, FlowError::NoPendingChallenge);
    assert_eq!(gateway.send_count(), 0);
}

#[tokio::test]
async fn test_resend_blocked_during_cooldown() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    flow.request_code(MOBILE, Channel::Sms).await.unwrap();

    assert!(!flow.can_resend());
    let err = flow.resend(Channel::Sms).await.unwrap_err();

    assert_eq!(err, FlowError::CooldownActive { remaining: 30 });
    assert!(err.is_local());
    assert_eq!(gateway.send_count(), 1);
    assert_eq!(flow.phase(), Phase::AwaitingCode);
}

#[tokio::test]
async fn test_reset_is_idempotent() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    flow.request_code(MOBILE, Channel::Sms).await.unwrap();

    flow.reset();
    let once = flow.snapshot();
    flow.reset();
    let twice = flow.snapshot();

    assert!(once.is_pristine());
    assert_eq!(once, twice);
    assert!(once.mobile_number.is_none());
    assert!(once.last_message.is_none());
}

#[tokio::test]
async fn test_reset_after_authentication_allows_new_login() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_verify(verified("tok"));
    gateway.push_send(sent("xyz789", "sent"));

    flow.request_code(MOBILE, Channel::Sms).await.unwrap();
    flow.verify_code("1234").await.unwrap();
    assert!(matches!(
        flow.verify_code("1234").await.unwrap_err(),
        FlowError::NoPendingChallenge
    ));

    flow.reset();
    flow.request_code("9123456780", Channel::MessagingApp).await.unwrap();

    let state = flow.snapshot();
    assert_eq!(state.pending.unwrap().challenge_id, "xyz789");
    assert!(state.user.is_none());
}

#[tokio::test]
async fn test_reset_during_request_drops_late_result() {
    let gate = Arc::new(Notify::new());
    let (flow, _, _) = build_with(
        MockGateway::gated(gate.clone()),
        MockSessionStore::new(false),
        quiet_config(),
    );
    let flow = Arc::new(flow);
    let mut updates = flow.subscribe();

    let pending_send = {
        let flow = flow.clone();
        tokio::spawn(async move { flow.request_code(MOBILE, Channel::Sms).await })
    };
    updates.wait_for(|state| state.in_flight).await.unwrap();

    flow.reset();
    gate.notify_one();

    let result = pending_send.await.unwrap();
    assert_eq!(result.unwrap_err(), FlowError::Superseded);
    assert!(flow.snapshot().is_pristine());
}

#[tokio::test]
async fn test_persist_failure_still_authenticates() {
    let (flow, gateway, _) = build_with(
        MockGateway::new(),
        MockSessionStore::new(true),
        quiet_config(),
    );
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_verify(verified("tok"));

    flow.request_code(MOBILE, Channel::Sms).await.unwrap();
    let notice = flow.verify_code("1234").await.unwrap();

    assert_eq!(notice.message, "OTP verified successfully");
    assert_eq!(flow.phase(), Phase::Authenticated);
}

#[tokio::test]
async fn test_sign_out_resets_and_clears_token() {
    let (flow, gateway, store) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    gateway.push_verify(verified("tok"));

    flow.request_code(MOBILE, Channel::Sms).await.unwrap();
    flow.verify_code("1234").await.unwrap();
    flow.sign_out().await.unwrap();

    assert!(flow.snapshot().is_pristine());
    assert_eq!(store.clear_count(), 1);
}

#[tokio::test]
async fn test_subscribers_see_transitions() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(sent("abc123", "sent"));
    let mut updates = flow.subscribe();

    flow.request_code(MOBILE, Channel::Sms).await.unwrap();

    assert!(updates.has_changed().unwrap());
    let state = updates.borrow_and_update().clone();
    assert_eq!(state.phase, Phase::AwaitingCode);
    assert_eq!(state, flow.snapshot());
}

#[tokio::test]
async fn test_gateway_error_kinds_are_classified() {
    let (flow, gateway, _) = build(quiet_config());
    gateway.push_send(Err(GatewayError::Unreachable("Malformed response from server".to_string())));

    let err = flow.request_code(MOBILE, Channel::Sms).await.unwrap_err();

    assert!(!err.is_local());
    assert_eq!(err.kind().code(), "UNREACHABLE");
    assert_eq!(err.to_string(), "Malformed response from server");
}
