//! Verification session lifetime configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Configuration for per-caller verification sessions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Seconds of inactivity after which a session is discarded
    pub idle_ttl_seconds: u64,

    /// Seconds between sweeps of idle sessions
    pub sweep_interval_seconds: u64,

    /// Header carrying the session identifier
    pub header_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_seconds: 1800,
            sweep_interval_seconds: 60,
            header_name: String::from("X-Verification-Session"),
        }
    }
}

impl SessionConfig {
    /// Apply `SESSION_IDLE_TTL_SECONDS` and `SESSION_SWEEP_INTERVAL_SECONDS`
    pub fn override_from_env(self) -> Self {
        Self {
            idle_ttl_seconds: env_or("SESSION_IDLE_TTL_SECONDS", self.idle_ttl_seconds),
            sweep_interval_seconds: env_or(
                "SESSION_SWEEP_INTERVAL_SECONDS",
                self.sweep_interval_seconds,
            ),
            header_name: self.header_name,
        }
    }
}
