//! Process-local state of one verification session

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::VerificationState;
use crate::domain::entities::{Channel, ChannelHandle, VerificationChallenge};
use crate::domain::value_objects::PhoneNumber;

/// Identifies one in-flight issuance so a late response can be recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueTicket(Uuid);

/// Holds at most one live challenge and the outcome of the last verification
///
/// The store never performs I/O. The orchestrator reads a snapshot, releases
/// the store while a channel call is in flight, then applies the response only
/// if the ticket or handle it started with is still current.
#[derive(Debug, Default)]
pub struct ChallengeStore {
    live: Option<VerificationChallenge>,
    verified: Option<(PhoneNumber, Channel)>,
    pending_issue: Option<IssueTicket>,
}

impl ChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, now: DateTime<Utc>) -> VerificationState {
        match &self.live {
            Some(challenge) if challenge.is_live(now) => VerificationState::CodeRequested,
            _ if self.verified.is_some() => VerificationState::CodeVerified,
            _ => VerificationState::Idle,
        }
    }

    /// The stored challenge, live or not
    pub fn current(&self) -> Option<&VerificationChallenge> {
        self.live.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn current_mut(&mut self) -> Option<&mut VerificationChallenge> {
        self.live.as_mut()
    }

    /// Remove the stored challenge if it expired or has no attempts left
    pub fn expire_stale(&mut self, now: DateTime<Utc>) -> Option<VerificationChallenge> {
        if self.live.as_ref().is_some_and(|c| !c.is_live(now)) {
            self.live.take()
        } else {
            None
        }
    }

    /// Register an issuance about to contact a channel
    ///
    /// A newer ticket supersedes any older one still in flight.
    pub fn begin_issue(&mut self) -> IssueTicket {
        let ticket = IssueTicket(Uuid::new_v4());
        self.pending_issue = Some(ticket);
        ticket
    }

    /// Install the challenge produced by `ticket`
    ///
    /// Returns `false`, leaving the store untouched, when the ticket was
    /// cancelled or superseded while the channel call was in flight.
    pub fn complete_issue(&mut self, ticket: IssueTicket, challenge: VerificationChallenge) -> bool {
        if self.pending_issue != Some(ticket) {
            return false;
        }
        self.pending_issue = None;
        self.verified = None;
        self.live = Some(challenge);
        true
    }

    /// Forget a failed issuance; the previous challenge, if any, stays live
    pub fn abandon_issue(&mut self, ticket: IssueTicket) {
        if self.pending_issue == Some(ticket) {
            self.pending_issue = None;
        }
    }

    /// Drop the stored challenge only
    pub fn discard(&mut self) -> Option<VerificationChallenge> {
        self.live.take()
    }

    /// Return to `Idle`: drop the challenge, the verified outcome and any pending issuance
    pub fn clear(&mut self) -> Option<VerificationChallenge> {
        self.pending_issue = None;
        self.verified = None;
        self.live.take()
    }

    /// Whether the challenge `id` with `handle` is still the stored one
    pub fn holds(&self, id: Uuid, handle: &ChannelHandle) -> bool {
        self.live
            .as_ref()
            .is_some_and(|c| c.id == id && c.owns_handle(handle))
    }

    /// Consume one attempt of challenge `id`
    ///
    /// Returns the attempts left, or `None` if `id` is no longer stored. The
    /// challenge is dropped when the count reaches zero.
    pub fn record_failure(&mut self, id: Uuid) -> Option<u32> {
        let challenge = self.live.as_mut().filter(|c| c.id == id)?;
        let remaining = challenge.record_failed_attempt();
        if remaining == 0 {
            self.live = None;
        }
        Some(remaining)
    }

    /// Move challenge `id` to `CodeVerified` and clear it
    pub fn mark_verified(&mut self, id: Uuid) -> Option<VerificationChallenge> {
        if !self.live.as_ref().is_some_and(|c| c.id == id) {
            return None;
        }
        let mut challenge = self.live.take()?;
        challenge.mark_verified();
        self.verified = Some((challenge.phone.clone(), challenge.channel));
        Some(challenge)
    }

    /// Phone confirmed by the last successful verification
    pub fn verified_phone(&self) -> Option<&PhoneNumber> {
        self.verified.as_ref().map(|(phone, _)| phone)
    }
}
