//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `channels` - Code delivery channels (identity provider, account backend)
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server and CORS configuration
//! - `session` - Verification session lifetime
//! - `verification` - Cooldown, expiry, attempts and phone number rules

pub mod channels;
pub mod environment;
pub mod server;
pub mod session;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use channels::{AccountBackend, AccountServiceConfig, ChannelsConfig, IdentityProviderConfig, SmsProviderKind};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::{CorsConfig, ServerConfig};
pub use session::SessionConfig;
pub use verification::{PhoneRulesConfig, VerificationConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Verification policy
    pub verification: VerificationConfig,

    /// Delivery channel configuration
    pub channels: ChannelsConfig,

    /// Session lifetime configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            verification: VerificationConfig::default(),
            channels: ChannelsConfig::default(),
            session: SessionConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    ///
    /// Development wires the console SMS provider and the in-memory account
    /// backend so the flow can be exercised without external services.
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::new("127.0.0.1", 8080),
            verification: VerificationConfig::default(),
            channels: ChannelsConfig::development(),
            session: SessionConfig::default(),
            cors: CorsConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            verification: VerificationConfig::default(),
            channels: ChannelsConfig::default(),
            session: SessionConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    ///
    /// A `.env` file is read first when present. Environment-specific
    /// defaults are then overridden by individual variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::production();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };

        config.server = config.server.override_from_env();
        config.verification = config.verification.override_from_env();
        config.channels = config.channels.override_from_env();
        config.session = config.session.override_from_env();
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        config
    }
}

/// Read and parse an environment variable, falling back to `default`
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_uses_local_doubles() {
        let config = AppConfig::development();
        assert_eq!(config.channels.sms_provider, SmsProviderKind::Console);
        assert_eq!(config.channels.account_backend, AccountBackend::Memory);
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_production_uses_remote_channels() {
        let config = AppConfig::production();
        assert_eq!(config.channels.sms_provider, SmsProviderKind::IdentityToolkit);
        assert_eq!(config.channels.account_backend, AccountBackend::Http);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_env_or_falls_back_on_missing_or_garbage() {
        assert_eq!(env_or("PV_SHARED_TEST_UNSET_VARIABLE", 42u64), 42);
    }
}
