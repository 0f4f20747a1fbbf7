//! Configuration for the verification service

use chrono::Duration;

use pv_shared::config::{PhoneRulesConfig, VerificationConfig};

/// Configuration for the verification orchestrator
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Seconds before an issued code expires
    pub code_ttl_seconds: i64,
    /// Confirmation attempts allowed per issued code
    pub max_attempts: u32,
    /// Minimum seconds between code issuances for the same phone
    pub resend_cooldown_seconds: i64,
    /// Expected length of a one-time code
    pub code_length: usize,
    /// National phone format accepted by the normalizer
    pub phone_rules: PhoneRulesConfig,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            code_ttl_seconds: config.code_ttl_seconds,
            max_attempts: config.max_attempts,
            resend_cooldown_seconds: config.resend_cooldown_seconds,
            code_length: config.code_length,
            phone_rules: config.phone.clone(),
        }
    }
}

impl VerificationServiceConfig {
    pub fn code_ttl(&self) -> Duration {
        Duration::seconds(self.code_ttl_seconds)
    }

    pub fn resend_cooldown(&self) -> Duration {
        Duration::seconds(self.resend_cooldown_seconds)
    }
}
