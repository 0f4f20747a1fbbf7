use chrono::{Duration, TimeZone, Utc};

use crate::domain::entities::{Channel, ChannelHandle, VerificationChallenge};
use crate::services::verification::{ChallengeStore, PhoneNormalizer, VerificationState};

fn challenge(token: &str) -> VerificationChallenge {
    let phone = PhoneNormalizer::default().normalize("0100000000").unwrap();
    VerificationChallenge::new(
        phone,
        ChannelHandle::new(Channel::Primary, token),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Duration::seconds(600),
        3,
    )
}

#[test]
fn test_completed_issue_becomes_live() {
    let mut store = ChallengeStore::new();
    let c = challenge("s1");
    let now = c.issued_at;

    let ticket = store.begin_issue();
    assert!(store.complete_issue(ticket, c));

    assert_eq!(store.state(now), VerificationState::CodeRequested);
}

#[test]
fn test_superseded_ticket_is_rejected() {
    let mut store = ChallengeStore::new();
    let first = store.begin_issue();
    let second = store.begin_issue();

    assert!(!store.complete_issue(first, challenge("s1")));
    assert!(store.complete_issue(second, challenge("s2")));
    assert_eq!(store.current().unwrap().external_handle.token(), "s2");
}

#[test]
fn test_clear_cancels_pending_issue() {
    let mut store = ChallengeStore::new();
    let ticket = store.begin_issue();

    store.clear();

    assert!(!store.complete_issue(ticket, challenge("s1")));
    assert!(store.current().is_none());
}

#[test]
fn test_abandoned_issue_keeps_previous_challenge() {
    let mut store = ChallengeStore::new();
    let t1 = store.begin_issue();
    store.complete_issue(t1, challenge("s1"));

    let t2 = store.begin_issue();
    store.abandon_issue(t2);

    assert_eq!(store.current().unwrap().external_handle.token(), "s1");
}

#[test]
fn test_failures_drop_challenge_at_zero() {
    let mut store = ChallengeStore::new();
    let c = challenge("s1");
    let id = c.id;
    let now = c.issued_at;
    let ticket = store.begin_issue();
    store.complete_issue(ticket, c);

    assert_eq!(store.record_failure(id), Some(2));
    assert_eq!(store.record_failure(id), Some(1));
    assert_eq!(store.record_failure(id), Some(0));
    assert_eq!(store.record_failure(id), None);
    assert_eq!(store.state(now), VerificationState::Idle);
}

#[test]
fn test_holds_requires_same_id_and_handle() {
    let mut store = ChallengeStore::new();
    let c = challenge("s1");
    let id = c.id;
    let handle = c.external_handle.clone();
    let ticket = store.begin_issue();
    store.complete_issue(ticket, c);

    assert!(store.holds(id, &handle));
    assert!(!store.holds(id, &ChannelHandle::new(Channel::Secondary, "s1")));
    assert!(!store.holds(uuid::Uuid::new_v4(), &handle));
}

#[test]
fn test_mark_verified_records_phone() {
    let mut store = ChallengeStore::new();
    let c = challenge("s1");
    let id = c.id;
    let now = c.issued_at;
    let ticket = store.begin_issue();
    store.complete_issue(ticket, c);

    assert!(store.mark_verified(id).is_some());

    assert_eq!(store.state(now), VerificationState::CodeVerified);
    assert_eq!(store.verified_phone().unwrap().as_str(), "+20100000000");
    assert!(store.current().is_none());
}

#[test]
fn test_expire_stale_removes_expired_challenge() {
    let mut store = ChallengeStore::new();
    let c = challenge("s1");
    let expires_at = c.expires_at;
    let ticket = store.begin_issue();
    store.complete_issue(ticket, c);

    assert!(store.expire_stale(expires_at).is_none());
    let later = expires_at + Duration::seconds(1);
    assert!(store.expire_stale(later).is_some());
    assert_eq!(store.state(later), VerificationState::Idle);
}
