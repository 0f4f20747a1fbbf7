//! Shared utilities and common types for the PetHaven verification server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error response structures
//! - Utility functions (phone masking, digit extraction)
//! - API response wrappers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ChannelsConfig, CorsConfig, Environment, LoggingConfig, ServerConfig,
    SessionConfig, VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{ApiResponse, HealthResponse};
pub use utils::phone;
