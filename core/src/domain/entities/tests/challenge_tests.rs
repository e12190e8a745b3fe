//! Unit tests for challenge entity

use crate::domain::entities::challenge::{Channel, PendingChallenge};

#[test]
fn test_channel_wire_labels() {
    assert_eq!(Channel::Sms.as_wire(), "sms");
    assert_eq!(Channel::MessagingApp.as_wire(), "whatsapp");
    assert_eq!(Channel::MessagingApp.display_name(), "WhatsApp");
    assert_eq!(Channel::default(), Channel::MessagingApp);
}

#[test]
fn test_channel_from_str() {
    assert_eq!("SMS".parse::<Channel>().unwrap(), Channel::Sms);
    assert_eq!("whatsapp".parse::<Channel>().unwrap(), Channel::MessagingApp);
    assert_eq!("messaging-app".parse::<Channel>().unwrap(), Channel::MessagingApp);
    assert!("email".parse::<Channel>().is_err());
}

#[test]
fn test_channel_serializes_as_via_label() {
    assert_eq!(serde_json::to_string(&Channel::Sms).unwrap(), "\"sms\"");
    assert_eq!(
        serde_json::to_string(&Channel::MessagingApp).unwrap(),
        "\"whatsapp\""
    );
}

#[test]
fn test_new_challenge() {
    let challenge = PendingChallenge::new("abc123", "9876543210", Channel::Sms);

    assert_eq!(challenge.challenge_id, "abc123");
    assert_eq!(challenge.mobile_number, "9876543210");
    assert_eq!(challenge.issued_channel, Channel::Sms);
    assert_eq!(challenge.verify_attempts, 0);
}

#[test]
fn test_record_rejection_until_exhausted() {
    let mut challenge = PendingChallenge::new("abc123", "9876543210", Channel::Sms);

    assert_eq!(challenge.record_rejection(), 1);
    assert!(!challenge.attempts_exhausted(3));
    challenge.record_rejection();
    assert_eq!(challenge.record_rejection(), 3);
    assert!(challenge.attempts_exhausted(3));
}
