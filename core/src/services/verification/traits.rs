//! Traits for the collaborators the verification core depends on

use async_trait::async_trait;
use std::fmt;

use crate::domain::value_objects::PhoneNumber;
use crate::errors::ChannelError;

/// Single-use proof that an issuance request originates from a real client
#[derive(Clone, PartialEq, Eq)]
pub struct AntiAutomationToken(String);

impl AntiAutomationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AntiAutomationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AntiAutomationToken(<redacted>)")
    }
}

/// Third-party SMS / identity provider (primary channel)
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Name used in logs
    fn provider_name(&self) -> &str;

    /// Send a code to `phone` and return the provider's session handle
    ///
    /// Fails with `TransientUnavailable`, `RateLimited` or `ConfigurationError`.
    async fn issue(
        &self,
        phone: &PhoneNumber,
        token: &AntiAutomationToken,
    ) -> Result<String, ChannelError>;

    /// Confirm `code` against the session handle returned by [`SmsProvider::issue`]
    ///
    /// Fails with `InvalidCode` or `Expired`.
    async fn confirm(&self, handle: &str, code: &str) -> Result<(), ChannelError>;
}

/// Anti-automation capability scoped to the caller's environment
#[async_trait]
pub trait AntiAutomationChallenge: Send + Sync {
    /// Obtain a fresh single-use token
    async fn acquire(&self) -> Result<AntiAutomationToken, ChannelError>;

    /// Drop a token after use or on error so it is never presented twice
    async fn invalidate(&self, token: &AntiAutomationToken);
}

/// Account backend owning the user record and the secondary code rail
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Generate and deliver an internal code; returns an opaque handle
    async fn issue_internal_code(&self, phone: &PhoneNumber) -> Result<String, ChannelError>;

    /// Validate an internal code for `phone`
    async fn confirm_internal_code(&self, phone: &PhoneNumber, code: &str)
        -> Result<(), ChannelError>;

    /// Set `phone_verified` and `phone_number` on the user record; idempotent
    async fn mark_phone_verified(&self, phone: &PhoneNumber) -> Result<(), ChannelError>;
}
