//! Domain entities and value objects for phone verification.

pub mod entities;
pub mod value_objects;

pub use entities::{Channel, ChannelHandle, ChallengeStatus, VerificationChallenge};
pub use value_objects::PhoneNumber;
