//! Verification challenge entity: one in-flight attempt for one phone.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::channel::{Channel, ChannelHandle};
use crate::domain::value_objects::PhoneNumber;

/// Stored status of a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    /// A code was issued and awaits confirmation
    CodeRequested,
    /// The code was confirmed by the issuing channel
    CodeVerified,
    /// The challenge outlived `expires_at`
    Expired,
}

/// One in-flight verification attempt
#[derive(Debug, Clone)]
pub struct VerificationChallenge {
    /// Unique identifier of this issuance
    pub id: Uuid,

    /// Canonical phone the code was sent to
    pub phone: PhoneNumber,

    /// Channel that issued the code
    pub channel: Channel,

    /// When the code was issued
    pub issued_at: DateTime<Utc>,

    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,

    /// Handle returned by the issuing channel
    pub external_handle: ChannelHandle,

    attempts_remaining: u32,
    status: ChallengeStatus,
}

impl VerificationChallenge {
    /// Create a challenge for a freshly issued code
    ///
    /// The recorded channel is taken from the handle, so a challenge can never
    /// claim a channel other than the one that produced its handle.
    pub fn new(
        phone: PhoneNumber,
        external_handle: ChannelHandle,
        issued_at: DateTime<Utc>,
        time_to_live: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone,
            channel: external_handle.issued_by(),
            issued_at,
            expires_at: issued_at + time_to_live,
            external_handle,
            attempts_remaining: max_attempts,
            status: ChallengeStatus::CodeRequested,
        }
    }

    /// Whether `now` is past the expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Effective status at `now`; time passage wins over the stored status
    pub fn status_at(&self, now: DateTime<Utc>) -> ChallengeStatus {
        if self.status == ChallengeStatus::CodeRequested && self.is_expired(now) {
            ChallengeStatus::Expired
        } else {
            self.status
        }
    }

    /// Still awaiting confirmation, unexpired, with attempts left
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == ChallengeStatus::CodeRequested && self.attempts_remaining > 0
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    /// Consume one attempt and return what is left
    pub fn record_failed_attempt(&mut self) -> u32 {
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        self.attempts_remaining
    }

    pub fn mark_verified(&mut self) {
        self.status = ChallengeStatus::CodeVerified;
    }

    /// Whether a channel response for `handle` belongs to this challenge
    pub fn owns_handle(&self, handle: &ChannelHandle) -> bool {
        &self.external_handle == handle
    }
}
