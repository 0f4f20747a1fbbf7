use chrono::{Duration, TimeZone, Utc};

use crate::services::verification::CooldownClock;

#[test]
fn test_window_opens_after_duration() {
    let clock = CooldownClock::new(Duration::seconds(300));
    let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let window = clock.window_for(issued_at);

    assert_eq!(window.next_resend_allowed_at, issued_at + Duration::seconds(300));
    assert!(!window.is_open(issued_at));
    assert!(window.is_open(issued_at + Duration::seconds(300)));
}

#[test]
fn test_remaining_is_rounded_up() {
    let clock = CooldownClock::new(Duration::seconds(300));
    let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    assert_eq!(clock.remaining(issued_at, issued_at), 300);
    assert_eq!(
        clock.remaining(issued_at, issued_at + Duration::milliseconds(1)),
        300
    );
    assert_eq!(
        clock.remaining(issued_at, issued_at + Duration::milliseconds(299_001)),
        1
    );
}

#[test]
fn test_remaining_never_negative() {
    let clock = CooldownClock::new(Duration::seconds(300));
    let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    assert_eq!(clock.remaining(issued_at, issued_at + Duration::hours(2)), 0);
}
