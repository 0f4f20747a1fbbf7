//! # PetHaven Core
//!
//! Phone number verification domain for the PetHaven backend.
//! This crate contains the phone number value object, the verification
//! challenge entity, the collaborator traits, the channel gateway with its
//! primary-to-secondary fallback and the orchestrator driving the
//! verification state machine.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
