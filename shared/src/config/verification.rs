//! Verification policy configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Fixed resend cooldown observed in production (5 minutes)
pub const DEFAULT_RESEND_COOLDOWN_SECONDS: i64 = 300;

/// Lifetime of an issued code (10 minutes)
pub const DEFAULT_CODE_TTL_SECONDS: i64 = 600;

/// Confirmation attempts allowed per issued code
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Verification policy: cooldown, expiry, attempts and phone rules
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Minimum seconds between two issuances for the same phone
    pub resend_cooldown_seconds: i64,

    /// Seconds before an issued code expires
    pub code_ttl_seconds: i64,

    /// Confirmation attempts allowed per issued code
    pub max_attempts: u32,

    /// Deadline applied by the transport layer to each channel call
    pub channel_timeout_seconds: u64,

    /// Expected length of a one-time code
    pub code_length: usize,

    /// Accepted phone number format
    #[serde(default)]
    pub phone: PhoneRulesConfig,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            resend_cooldown_seconds: DEFAULT_RESEND_COOLDOWN_SECONDS,
            code_ttl_seconds: DEFAULT_CODE_TTL_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            channel_timeout_seconds: 10,
            code_length: 6,
            phone: PhoneRulesConfig::default(),
        }
    }
}

impl VerificationConfig {
    /// Apply `VERIFICATION_*` and `PHONE_*` overrides
    pub fn override_from_env(self) -> Self {
        Self {
            resend_cooldown_seconds: env_or(
                "VERIFICATION_RESEND_COOLDOWN_SECONDS",
                self.resend_cooldown_seconds,
            ),
            code_ttl_seconds: env_or("VERIFICATION_CODE_TTL_SECONDS", self.code_ttl_seconds),
            max_attempts: env_or("VERIFICATION_MAX_ATTEMPTS", self.max_attempts),
            channel_timeout_seconds: env_or(
                "VERIFICATION_CHANNEL_TIMEOUT_SECONDS",
                self.channel_timeout_seconds,
            ),
            code_length: env_or("VERIFICATION_CODE_LENGTH", self.code_length),
            phone: self.phone.override_from_env(),
        }
    }
}

/// National mobile number rules used to canonicalize user input
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PhoneRulesConfig {
    /// Country calling code without `+`
    pub country_code: String,

    /// Trunk prefix dropped after the country code
    pub trunk_prefix: String,

    /// Number of digits in the national format, trunk prefix included
    pub national_length: usize,

    /// Accepted national mobile prefixes, trunk prefix included
    pub mobile_prefixes: Vec<String>,
}

impl Default for PhoneRulesConfig {
    fn default() -> Self {
        Self {
            country_code: String::from("20"),
            trunk_prefix: String::from("0"),
            national_length: 10,
            mobile_prefixes: ["010", "011", "012", "015"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl PhoneRulesConfig {
    /// Apply `PHONE_COUNTRY_CODE`, `PHONE_NATIONAL_LENGTH` and `PHONE_MOBILE_PREFIXES`
    pub fn override_from_env(self) -> Self {
        let mobile_prefixes = std::env::var("PHONE_MOBILE_PREFIXES")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|prefixes| !prefixes.is_empty())
            .unwrap_or(self.mobile_prefixes);

        Self {
            country_code: std::env::var("PHONE_COUNTRY_CODE").unwrap_or(self.country_code),
            trunk_prefix: std::env::var("PHONE_TRUNK_PREFIX").unwrap_or(self.trunk_prefix),
            national_length: env_or("PHONE_NATIONAL_LENGTH", self.national_length),
            mobile_prefixes,
        }
    }
}
