//! API response wrappers

pub mod response;

pub use response::{ApiResponse, HealthResponse};
