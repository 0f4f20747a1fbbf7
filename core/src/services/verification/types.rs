//! Types for verification service results

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Channel;
use crate::domain::value_objects::PhoneNumber;

/// Observable state of a verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Idle,
    CodeRequested,
    CodeVerified,
}

/// Result of a successful code request
#[derive(Debug, Clone, Serialize)]
pub struct RequestCodeResult {
    /// Channel that ultimately issued the code
    pub channel_used: Channel,
    /// Canonical phone the code was sent to
    pub phone: PhoneNumber,
    /// When a resend becomes possible
    pub next_resend_at: DateTime<Utc>,
    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful code submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmitCodeResult {
    /// Always true; failures are reported as errors
    pub verified: bool,
    /// Verified canonical phone
    pub phone: PhoneNumber,
    /// Channel that confirmed the code
    pub channel: Channel,
    /// Set when the user record could not be updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_update_warning: Option<String>,
}

/// Point-in-time view of a verification session
#[derive(Debug, Clone, Serialize)]
pub struct VerificationSnapshot {
    pub state: VerificationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub resend_after_seconds: u64,
}
