//! Channel gateway: primary SMS provider with fallback to the account backend
//!
//! Both channels expose the same capability, issue a code and later confirm
//! it. The gateway tries the primary channel first and hands over to the
//! secondary channel only when the primary reports a capacity failure.
//! Confirmation is always routed to the channel that issued the handle.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::traits::{AccountService, AntiAutomationChallenge, SmsProvider};
use crate::domain::entities::{Channel, ChannelHandle};
use crate::domain::value_objects::PhoneNumber;
use crate::errors::ChannelError;

/// A code delivery/confirmation backend
#[async_trait]
pub trait CodeChannel: Send + Sync {
    /// Which channel slot this backend serves
    fn kind(&self) -> Channel;

    /// Deliver a code to `phone`
    async fn issue(&self, phone: &PhoneNumber) -> Result<ChannelHandle, ChannelError>;

    /// Confirm `code` for a handle this channel issued
    async fn confirm(
        &self,
        phone: &PhoneNumber,
        handle: &ChannelHandle,
        code: &str,
    ) -> Result<(), ChannelError>;
}

/// Primary channel backed by the third-party provider
pub struct PrimaryChannel {
    provider: Arc<dyn SmsProvider>,
    anti_automation: Arc<dyn AntiAutomationChallenge>,
}

impl PrimaryChannel {
    pub fn new(
        provider: Arc<dyn SmsProvider>,
        anti_automation: Arc<dyn AntiAutomationChallenge>,
    ) -> Self {
        Self {
            provider,
            anti_automation,
        }
    }
}

#[async_trait]
impl CodeChannel for PrimaryChannel {
    fn kind(&self) -> Channel {
        Channel::Primary
    }

    async fn issue(&self, phone: &PhoneNumber) -> Result<ChannelHandle, ChannelError> {
        // Tokens are single-use: acquire per call, invalidate whatever happens.
        let token = self.anti_automation.acquire().await?;
        let result = self.provider.issue(phone, &token).await;
        self.anti_automation.invalidate(&token).await;

        result.map(|session| ChannelHandle::new(Channel::Primary, session))
    }

    async fn confirm(
        &self,
        _phone: &PhoneNumber,
        handle: &ChannelHandle,
        code: &str,
    ) -> Result<(), ChannelError> {
        ensure_issued_by(handle, Channel::Primary)?;
        self.provider.confirm(handle.token(), code).await
    }
}

/// Secondary channel backed by the account backend's own codes
pub struct SecondaryChannel {
    accounts: Arc<dyn AccountService>,
}

impl SecondaryChannel {
    pub fn new(accounts: Arc<dyn AccountService>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl CodeChannel for SecondaryChannel {
    fn kind(&self) -> Channel {
        Channel::Secondary
    }

    async fn issue(&self, phone: &PhoneNumber) -> Result<ChannelHandle, ChannelError> {
        let handle = self.accounts.issue_internal_code(phone).await?;
        let token = if handle.is_empty() {
            phone.as_str().to_string()
        } else {
            handle
        };
        Ok(ChannelHandle::new(Channel::Secondary, token))
    }

    async fn confirm(
        &self,
        phone: &PhoneNumber,
        handle: &ChannelHandle,
        code: &str,
    ) -> Result<(), ChannelError> {
        ensure_issued_by(handle, Channel::Secondary)?;
        self.accounts.confirm_internal_code(phone, code).await
    }
}

fn ensure_issued_by(handle: &ChannelHandle, confirming: Channel) -> Result<(), ChannelError> {
    if handle.issued_by() == confirming {
        Ok(())
    } else {
        Err(ChannelError::ChannelMismatch {
            issued_by: handle.issued_by(),
            confirming,
        })
    }
}

/// Routes issuance and confirmation between the two channels
pub struct ChannelGateway {
    primary: Arc<dyn CodeChannel>,
    secondary: Arc<dyn CodeChannel>,
}

impl ChannelGateway {
    pub fn new(primary: Arc<dyn CodeChannel>, secondary: Arc<dyn CodeChannel>) -> Self {
        Self { primary, secondary }
    }

    /// Gateway over a provider, an anti-automation capability and an account backend
    pub fn from_collaborators(
        provider: Arc<dyn SmsProvider>,
        anti_automation: Arc<dyn AntiAutomationChallenge>,
        accounts: Arc<dyn AccountService>,
    ) -> Self {
        Self::new(
            Arc::new(PrimaryChannel::new(provider, anti_automation)),
            Arc::new(SecondaryChannel::new(accounts)),
        )
    }

    fn slot(&self, channel: Channel) -> &Arc<dyn CodeChannel> {
        match channel {
            Channel::Primary => &self.primary,
            Channel::Secondary => &self.secondary,
        }
    }

    /// Issue a code, falling back once from primary to secondary
    ///
    /// On failure the error is paired with the channel that produced it.
    pub async fn issue(&self, phone: &PhoneNumber) -> Result<ChannelHandle, (Channel, ChannelError)> {
        let primary_error = match self.primary.issue(phone).await {
            Ok(handle) => return self.accept_issued(Channel::Primary, handle),
            Err(e) => e,
        };

        if !primary_error.triggers_fallback() {
            log_terminal_issue_failure(Channel::Primary, phone, &primary_error);
            return Err((Channel::Primary, primary_error));
        }

        warn!(
            phone = %phone.masked(),
            error = %primary_error,
            event = "channel_fallback",
            "Primary channel cannot issue a code, falling back to secondary channel"
        );

        match self.secondary.issue(phone).await {
            Ok(handle) => {
                info!(
                    phone = %phone.masked(),
                    event = "channel_fallback_succeeded",
                    "Secondary channel issued the verification code"
                );
                self.accept_issued(Channel::Secondary, handle)
            }
            Err(secondary_error) => {
                log_terminal_issue_failure(Channel::Secondary, phone, &secondary_error);
                Err((Channel::Secondary, secondary_error))
            }
        }
    }

    fn accept_issued(
        &self,
        channel: Channel,
        handle: ChannelHandle,
    ) -> Result<ChannelHandle, (Channel, ChannelError)> {
        if handle.issued_by() != channel {
            return Err((
                channel,
                ChannelError::ChannelMismatch {
                    issued_by: handle.issued_by(),
                    confirming: channel,
                },
            ));
        }
        Ok(handle)
    }

    /// Confirm `code` on the channel recorded for the challenge
    ///
    /// Fails with `ChannelMismatch`, without contacting any channel, when the
    /// handle was issued elsewhere or the slot is served by another channel.
    pub async fn confirm(
        &self,
        recorded: Channel,
        phone: &PhoneNumber,
        handle: &ChannelHandle,
        code: &str,
    ) -> Result<(), ChannelError> {
        let channel = self.slot(recorded);
        if handle.issued_by() != recorded || channel.kind() != recorded {
            let err = ChannelError::ChannelMismatch {
                issued_by: handle.issued_by(),
                confirming: channel.kind(),
            };
            error!(
                phone = %phone.masked(),
                recorded = %recorded,
                error = %err,
                event = "channel_mismatch",
                "Refusing cross-channel code confirmation"
            );
            return Err(err);
        }

        channel.confirm(phone, handle, code).await
    }
}

fn log_terminal_issue_failure(channel: Channel, phone: &PhoneNumber, err: &ChannelError) {
    match err {
        ChannelError::ConfigurationError(_) => error!(
            channel = %channel,
            phone = %phone.masked(),
            error = %err,
            event = "channel_misconfigured",
            "Verification channel is misconfigured and needs operator attention"
        ),
        _ => warn!(
            channel = %channel,
            phone = %phone.masked(),
            error = %err,
            event = "code_issue_failed",
            "Verification channel failed to issue a code"
        ),
    }
}
