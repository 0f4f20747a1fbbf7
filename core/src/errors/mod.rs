//! Domain-specific error types and error handling.

mod types;

pub use types::ErrorCategory;

use thiserror::Error;

use crate::domain::entities::Channel;

/// Why a raw phone input was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneFormatError {
    #[error("Phone number is empty")]
    Empty,

    #[error("Phone number must have {expected} national digits, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("Phone number does not start with a supported mobile prefix")]
    UnsupportedPrefix,

    #[error("Only +{expected} numbers are supported")]
    UnsupportedCountryCode { expected: String },
}

/// Failures reported by a code delivery/confirmation channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel could not be reached or timed out before dispatch
    #[error("Channel temporarily unavailable: {0}")]
    TransientUnavailable(String),

    /// The channel refused because of quota or rate limits
    #[error("Channel rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification code expired")]
    Expired,

    /// The channel is unusable until an operator intervenes
    #[error("Channel misconfigured: {0}")]
    ConfigurationError(String),

    /// The request left this process but the response was lost
    #[error("Network failure after dispatch: {0}")]
    Network(String),

    /// No anti-automation token could be obtained for the primary channel
    #[error("Anti-automation challenge unavailable: {0}")]
    AntiAutomation(String),

    #[error("Code issued by {issued_by} channel cannot be confirmed on {confirming} channel")]
    ChannelMismatch { issued_by: Channel, confirming: Channel },
}

impl ChannelError {
    /// Capacity failures from the primary channel hand over to the secondary
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            ChannelError::TransientUnavailable(_) | ChannelError::RateLimited(_)
        )
    }
}

/// Errors surfaced to callers of the verification orchestrator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid phone number format: {0}")]
    InvalidFormat(#[from] PhoneFormatError),

    #[error("Please wait {remaining_seconds} seconds before requesting a new code")]
    CooldownActive { remaining_seconds: u64 },

    #[error("Please complete the anti-automation check and try again")]
    AntiAutomationRequired,

    #[error("Verification service temporarily unavailable: {message}")]
    TransientUnavailable { message: String },

    #[error("Verification is currently unavailable")]
    ConfigurationError { channel: Channel, message: String },

    #[error("Invalid verification code. {attempts_remaining} attempts remaining")]
    InvalidCode { attempts_remaining: u32 },

    #[error("Maximum attempts exceeded. Please request a new code")]
    AttemptsExhausted,

    #[error("Verification code expired. Please request a new code")]
    Expired,

    #[error("No verification in progress. Please request a code first")]
    NoActiveChallenge,

    #[error("Code issued by {issued_by} channel cannot be confirmed on {confirming} channel")]
    ChannelMismatch { issued_by: Channel, confirming: Channel },

    #[error("Verification was cancelled")]
    Cancelled,

    #[error("Phone number has not been verified in this session")]
    NotVerified,

    #[error("Failed to update the user record: {0}")]
    RecordUpdateFailed(String),
}

impl VerificationError {
    /// Map a failure of the final issuing channel
    pub fn from_issue_failure(channel: Channel, error: ChannelError) -> Self {
        match error {
            ChannelError::TransientUnavailable(message)
            | ChannelError::RateLimited(message)
            | ChannelError::Network(message) => VerificationError::TransientUnavailable { message },
            ChannelError::AntiAutomation(_) => VerificationError::AntiAutomationRequired,
            ChannelError::ChannelMismatch {
                issued_by,
                confirming,
            } => VerificationError::ChannelMismatch {
                issued_by,
                confirming,
            },
            ChannelError::ConfigurationError(message) => {
                VerificationError::ConfigurationError { channel, message }
            }
            // A channel answering an issuance with a code verdict is broken.
            other @ (ChannelError::InvalidCode | ChannelError::Expired) => {
                VerificationError::ConfigurationError {
                    channel,
                    message: format!("unexpected issuance response: {}", other),
                }
            }
        }
    }
}

pub type VerificationResult<T> = Result<T, VerificationError>;
