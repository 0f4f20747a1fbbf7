//! SMS Provider Module
//!
//! Primary-channel providers implementing the core `SmsProvider` trait.
//!
//! - **Identity Toolkit**: production phone sign-in REST API
//! - **Console**: logs codes for local development

pub mod console_sms;
pub mod identity_toolkit;

pub use console_sms::ConsoleSmsProvider;
pub use identity_toolkit::{
    classify_provider_error, extract_error_code, IdentityToolkitConfig, IdentityToolkitSmsProvider,
};

#[cfg(test)]
mod tests;
