//! Domain entities for phone verification.

pub mod challenge;
pub mod channel;


pub use challenge::{ChallengeStatus, VerificationChallenge};
pub use channel::{Channel, ChannelHandle};
