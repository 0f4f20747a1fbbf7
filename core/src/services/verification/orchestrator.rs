//! Verification orchestrator driving the per-session state machine
//!
//! States: `Idle -> CodeRequested -> CodeVerified`. A resend loops on
//! `CodeRequested`; expiry, exhaustion and cancel return to `Idle`.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::challenge_store::ChallengeStore;
use super::clock::{Clock, SystemClock};
use super::config::VerificationServiceConfig;
use super::cooldown::CooldownClock;
use super::gateway::ChannelGateway;
use super::normalizer::PhoneNormalizer;
use super::traits::AccountService;
use super::types::{RequestCodeResult, SubmitCodeResult, VerificationSnapshot, VerificationState};
use crate::domain::entities::VerificationChallenge;
use crate::domain::value_objects::PhoneNumber;
use crate::errors::{ChannelError, VerificationError, VerificationResult};

/// Top-level verification component for one session
///
/// Channel calls are made without holding the session lock, so
/// [`cancel`](Self::cancel) never waits for the network. Responses that
/// arrive for a cancelled or replaced challenge are discarded.
pub struct VerificationOrchestrator {
    normalizer: PhoneNormalizer,
    gateway: ChannelGateway,
    accounts: Arc<dyn AccountService>,
    clock: Arc<dyn Clock>,
    cooldown: CooldownClock,
    config: VerificationServiceConfig,
    store: Mutex<ChallengeStore>,
}

impl VerificationOrchestrator {
    /// Create an orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - Expiry, attempts, cooldown and phone rules
    /// * `gateway` - Primary/secondary channel routing
    /// * `accounts` - Collaborator owning the user record
    pub fn new(
        config: VerificationServiceConfig,
        gateway: ChannelGateway,
        accounts: Arc<dyn AccountService>,
    ) -> Self {
        Self {
            normalizer: PhoneNormalizer::new(config.phone_rules.clone()),
            cooldown: CooldownClock::new(config.resend_cooldown()),
            gateway,
            accounts,
            clock: Arc::new(SystemClock),
            config,
            store: Mutex::new(ChallengeStore::new()),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Send a code to `raw_phone`
    ///
    /// A live challenge for another phone is discarded. A live challenge for
    /// the same phone blocks the request until its cooldown elapses, without
    /// contacting any channel.
    ///
    /// # Returns
    ///
    /// * `Ok(RequestCodeResult)` - The channel that issued the code and the timing of the challenge
    /// * `Err(VerificationError)` - `InvalidFormat`, `CooldownActive`, `TransientUnavailable`,
    ///   `ConfigurationError`, `AntiAutomationRequired` or `Cancelled`
    pub async fn request_code(&self, raw_phone: &str) -> VerificationResult<RequestCodeResult> {
        let phone = self.normalizer.normalize(raw_phone).map_err(|e| {
            warn!(
                error = %e,
                event = "invalid_phone_format",
                "Rejected phone number input"
            );
            VerificationError::from(e)
        })?;

        let ticket = {
            let mut store = self.store.lock().await;
            let now = self.clock.now();

            if let Some(stale) = store.expire_stale(now) {
                info!(
                    phone = %stale.phone.masked(),
                    challenge_id = %stale.id,
                    event = "challenge_expired",
                    "Dropped challenge that is no longer live"
                );
            }

            let existing = store
                .current()
                .map(|c| (c.phone == phone, c.issued_at, c.id));
            match existing {
                Some((true, issued_at, _)) => {
                    let remaining = self.cooldown.remaining(issued_at, now);
                    if remaining > 0 {
                        warn!(
                            phone = %phone.masked(),
                            cooldown_remaining = remaining,
                            event = "cooldown_active",
                            "Verification code resend requested during cooldown"
                        );
                        return Err(VerificationError::CooldownActive {
                            remaining_seconds: remaining,
                        });
                    }
                }
                Some((false, _, challenge_id)) => {
                    store.discard();
                    info!(
                        phone = %phone.masked(),
                        challenge_id = %challenge_id,
                        event = "challenge_replaced",
                        "Discarded challenge for a different phone number"
                    );
                }
                None => {}
            }

            store.begin_issue()
        };

        let issued = self.gateway.issue(&phone).await;

        let mut store = self.store.lock().await;
        let handle = match issued {
            Ok(handle) => handle,
            Err((channel, e)) => {
                store.abandon_issue(ticket);
                return Err(VerificationError::from_issue_failure(channel, e));
            }
        };

        let challenge = VerificationChallenge::new(
            phone.clone(),
            handle,
            self.clock.now(),
            self.config.code_ttl(),
            self.config.max_attempts,
        );
        let result = RequestCodeResult {
            channel_used: challenge.channel,
            phone,
            next_resend_at: self.cooldown.window_for(challenge.issued_at).next_resend_allowed_at,
            expires_at: challenge.expires_at,
        };
        let challenge_id = challenge.id;

        if !store.complete_issue(ticket, challenge) {
            info!(
                phone = %result.phone.masked(),
                channel = %result.channel_used,
                event = "stale_issue_discarded",
                "Discarded code issued for a cancelled request"
            );
            return Err(VerificationError::Cancelled);
        }

        info!(
            phone = %result.phone.masked(),
            channel = %result.channel_used,
            challenge_id = %challenge_id,
            event = "code_issued",
            "Verification code issued"
        );

        Ok(result)
    }

    /// Confirm `code` against the live challenge
    ///
    /// Confirmation goes to the channel that issued the challenge and nowhere
    /// else. On success the user record is updated best-effort; a failed
    /// update is reported through `record_update_warning`.
    ///
    /// # Returns
    ///
    /// * `Ok(SubmitCodeResult)` - The phone is verified
    /// * `Err(VerificationError)` - `InvalidCode`, `AttemptsExhausted`, `Expired`,
    ///   `ChannelMismatch`, `NoActiveChallenge`, `TransientUnavailable` or `Cancelled`
    pub async fn submit_code(&self, code: &str) -> VerificationResult<SubmitCodeResult> {
        let code = code.trim();

        let (challenge_id, phone, channel, handle) = {
            let mut store = self.store.lock().await;
            let now = self.clock.now();

            let snapshot = store.current().map(|c| {
                (
                    c.id,
                    c.phone.clone(),
                    c.channel,
                    c.external_handle.clone(),
                    c.is_expired(now),
                    c.attempts_remaining(),
                )
            });
            let Some((id, phone, channel, handle, expired, attempts_remaining)) = snapshot else {
                return Err(VerificationError::NoActiveChallenge);
            };

            if expired {
                store.discard();
                info!(
                    phone = %phone.masked(),
                    challenge_id = %id,
                    event = "challenge_expired",
                    "Code submitted after expiry"
                );
                return Err(VerificationError::Expired);
            }

            if attempts_remaining == 0 {
                store.discard();
                return Err(VerificationError::AttemptsExhausted);
            }

            if !self.is_well_formed(code) {
                warn!(
                    phone = %phone.masked(),
                    code_length = code.len(),
                    event = "invalid_code_format",
                    "Malformed verification code rejected before reaching a channel"
                );
                return Err(VerificationError::InvalidCode { attempts_remaining });
            }

            (id, phone, channel, handle)
        };

        let outcome = self.gateway.confirm(channel, &phone, &handle, code).await;

        let mut store = self.store.lock().await;
        if !store.holds(challenge_id, &handle) {
            info!(
                phone = %phone.masked(),
                challenge_id = %challenge_id,
                event = "stale_confirmation_discarded",
                "Discarded confirmation for a cancelled or replaced challenge"
            );
            return Err(VerificationError::Cancelled);
        }

        match outcome {
            Ok(()) => {
                store.mark_verified(challenge_id);
                drop(store);

                info!(
                    phone = %phone.masked(),
                    channel = %channel,
                    event = "code_verified",
                    "Verification code confirmed"
                );

                let record_update_warning = self.update_record(&phone).await.err();
                Ok(SubmitCodeResult {
                    verified: true,
                    phone,
                    channel,
                    record_update_warning,
                })
            }
            Err(ChannelError::InvalidCode) => {
                let remaining = store.record_failure(challenge_id).unwrap_or(0);
                if remaining == 0 {
                    warn!(
                        phone = %phone.masked(),
                        event = "attempts_exhausted",
                        "Maximum verification attempts exceeded"
                    );
                    Err(VerificationError::AttemptsExhausted)
                } else {
                    warn!(
                        phone = %phone.masked(),
                        remaining_attempts = remaining,
                        event = "code_rejected",
                        "Verification code rejected"
                    );
                    Err(VerificationError::InvalidCode {
                        attempts_remaining: remaining,
                    })
                }
            }
            Err(ChannelError::Expired) => {
                store.discard();
                Err(VerificationError::Expired)
            }
            Err(ChannelError::ChannelMismatch {
                issued_by,
                confirming,
            }) => Err(VerificationError::ChannelMismatch {
                issued_by,
                confirming,
            }),
            Err(ChannelError::ConfigurationError(message)) => {
                error!(
                    channel = %channel,
                    error = %message,
                    event = "channel_misconfigured",
                    "Verification channel is misconfigured and needs operator attention"
                );
                Err(VerificationError::ConfigurationError { channel, message })
            }
            Err(other) => {
                warn!(
                    channel = %channel,
                    error = %other,
                    event = "confirmation_unavailable",
                    "Verification channel could not confirm the code"
                );
                Err(VerificationError::TransientUnavailable {
                    message: other.to_string(),
                })
            }
        }
    }

    /// Retry the user record update after a verification whose update failed
    pub async fn retry_record_update(&self) -> VerificationResult<()> {
        let phone = {
            let store = self.store.lock().await;
            store
                .verified_phone()
                .cloned()
                .ok_or(VerificationError::NotVerified)?
        };

        self.update_record(&phone)
            .await
            .map_err(VerificationError::RecordUpdateFailed)
    }

    /// Drop any challenge and any in-flight issuance; idempotent
    pub async fn cancel(&self) {
        let mut store = self.store.lock().await;
        if let Some(challenge) = store.clear() {
            info!(
                phone = %challenge.phone.masked(),
                challenge_id = %challenge.id,
                event = "challenge_cancelled",
                "Verification cancelled"
            );
        }
    }

    /// Seconds until a resend is allowed for the live challenge, floor 0
    pub async fn remaining_cooldown(&self) -> u64 {
        let store = self.store.lock().await;
        let now = self.clock.now();
        store
            .current()
            .filter(|c| c.is_live(now))
            .map(|c| self.cooldown.remaining(c.issued_at, now))
            .unwrap_or(0)
    }

    pub async fn state(&self) -> VerificationState {
        let store = self.store.lock().await;
        store.state(self.clock.now())
    }

    pub async fn snapshot(&self) -> VerificationSnapshot {
        let store = self.store.lock().await;
        let now = self.clock.now();
        let live = store.current().filter(|c| c.is_live(now));
        VerificationSnapshot {
            state: store.state(now),
            channel: live.map(|c| c.channel),
            attempts_remaining: live.map(|c| c.attempts_remaining()),
            expires_at: live.map(|c| c.expires_at),
            resend_after_seconds: live
                .map(|c| self.cooldown.remaining(c.issued_at, now))
                .unwrap_or(0),
        }
    }

    fn is_well_formed(&self, code: &str) -> bool {
        code.len() == self.config.code_length && code.chars().all(|c| c.is_ascii_digit())
    }

    async fn update_record(&self, phone: &PhoneNumber) -> Result<(), String> {
        match self.accounts.mark_phone_verified(phone).await {
            Ok(()) => {
                info!(
                    phone = %phone.masked(),
                    event = "record_updated",
                    "User record marked as phone verified"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    phone = %phone.masked(),
                    error = %e,
                    event = "record_update_failed",
                    "Phone verified but user record update failed"
                );
                Err(format!("Phone verified but the user record was not updated: {}", e))
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn with_store<R>(&self, f: impl FnOnce(&mut ChallengeStore) -> R) -> R {
        let mut store = self.store.lock().await;
        f(&mut store)
    }
}
