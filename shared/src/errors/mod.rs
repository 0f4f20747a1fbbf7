//! Shared error response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (remaining attempts, retry delay, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes returned by the verification API
pub mod error_codes {
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const PHONE_INVALID: &str = "PHONE_INVALID";
    pub const COOLDOWN_ACTIVE: &str = "COOLDOWN_ACTIVE";
    pub const ANTI_AUTOMATION_REQUIRED: &str = "ANTI_AUTOMATION_REQUIRED";
    pub const CHANNEL_UNAVAILABLE: &str = "CHANNEL_UNAVAILABLE";
    pub const SERVICE_MISCONFIGURED: &str = "SERVICE_MISCONFIGURED";
    pub const VERIFICATION_CODE_INVALID: &str = "VERIFICATION_CODE_INVALID";
    pub const VERIFICATION_CODE_EXPIRED: &str = "VERIFICATION_CODE_EXPIRED";
    pub const ATTEMPTS_EXHAUSTED: &str = "ATTEMPTS_EXHAUSTED";
    pub const NO_ACTIVE_CHALLENGE: &str = "NO_ACTIVE_CHALLENGE";
    pub const CHANNEL_MISMATCH: &str = "CHANNEL_MISMATCH";
    pub const CANCELLED: &str = "CANCELLED";
    pub const NOT_VERIFIED: &str = "NOT_VERIFIED";
    pub const RECORD_UPDATE_FAILED: &str = "RECORD_UPDATE_FAILED";
    pub const SESSION_BUSY: &str = "SESSION_BUSY";
    pub const SESSION_NOT_FOUND: &str = "SESSION_NOT_FOUND";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_detail() {
        let response = ErrorResponse::new(error_codes::COOLDOWN_ACTIVE, "wait")
            .add_detail("retry_after", 120);
        let details = response.details.unwrap();
        assert_eq!(details["retry_after"], serde_json::json!(120));
    }
}
