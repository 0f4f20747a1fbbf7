//! Phone verification module
//!
//! This module provides the complete phone verification workflow:
//! - Phone number normalization into one canonical form
//! - A per-session challenge store owning the verification state machine
//! - Resend cooldown tracking
//! - A channel gateway issuing codes through the primary SMS provider with a
//!   transparent fallback to the account backend's own codes
//! - The orchestrator tying these together and reconciling the result into
//!   the user record

mod challenge_store;
mod clock;
mod config;
mod cooldown;
mod gateway;
mod normalizer;
mod orchestrator;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use challenge_store::{ChallengeStore, IssueTicket};
pub use clock::{Clock, SystemClock};
pub use config::VerificationServiceConfig;
pub use cooldown::{CooldownClock, CooldownWindow};
pub use gateway::{ChannelGateway, CodeChannel, PrimaryChannel, SecondaryChannel};
pub use normalizer::PhoneNormalizer;
pub use orchestrator::VerificationOrchestrator;
pub use traits::{AccountService, AntiAutomationChallenge, AntiAutomationToken, SmsProvider};
pub use types::{RequestCodeResult, SubmitCodeResult, VerificationSnapshot, VerificationState};
