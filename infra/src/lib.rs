//! # Infrastructure Layer
//!
//! Concrete collaborators for the phone verification core.
//!
//! ## Architecture
//!
//! - **SMS**: the Identity Toolkit provider (primary channel) and a console
//!   provider for development
//! - **Account**: the account backend over HTTP, plus an in-memory double
//! - **Anti-automation**: the client-supplied token slot
//! - **Deadline**: per-call timeout decorator for every channel
//! - **Factory**: builds the collaborators from `ChannelsConfig`

// Re-export core types for convenience
pub use pv_core::errors::*;

/// Account backend module
pub mod account;

/// Anti-automation token handling
pub mod anti_automation;

/// Timeout decorator for channel collaborators
pub mod deadline;

/// Collaborator construction from configuration
pub mod factory;

/// SMS provider module
pub mod sms;

pub use account::{HttpAccountService, InMemoryAccountService};
pub use anti_automation::ClientTokenSlot;
pub use deadline::Deadline;
pub use factory::ChannelFactory;
pub use sms::{ConsoleSmsProvider, IdentityToolkitSmsProvider};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP client construction error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

/// Map a transport failure from `reqwest` onto the channel taxonomy
///
/// Failures before the request left this process are retryable elsewhere;
/// anything later may already have delivered a code. The URL is stripped
/// from the message since it ends up in logs.
pub(crate) fn transport_error(e: reqwest::Error) -> ChannelError {
    let retryable = e.is_connect() || e.is_timeout();
    let message = e.without_url().to_string();
    if retryable {
        ChannelError::TransientUnavailable(message)
    } else {
        ChannelError::Network(message)
    }
}
