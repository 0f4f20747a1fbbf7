//! Code delivery channel configuration

use serde::{Deserialize, Serialize};

/// Which implementation backs the primary SMS channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmsProviderKind {
    /// Identity Toolkit phone authentication REST API
    IdentityToolkit,
    /// Logs codes instead of sending them (development only)
    Console,
}

impl std::str::FromStr for SmsProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identity-toolkit" | "identity_toolkit" | "firebase" => Ok(Self::IdentityToolkit),
            "console" | "mock" => Ok(Self::Console),
            _ => Err(format!("Unknown SMS provider: {}", s)),
        }
    }
}

/// Which implementation backs the account collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountBackend {
    /// Remote account REST API
    Http,
    /// Process-local store (development only)
    Memory,
}

impl std::str::FromStr for AccountBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" | "remote" => Ok(Self::Http),
            "memory" | "mock" => Ok(Self::Memory),
            _ => Err(format!("Unknown account backend: {}", s)),
        }
    }
}

/// Identity provider (primary channel) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityProviderConfig {
    /// REST base URL, without trailing slash
    pub base_url: String,

    /// Public web API key of the project
    pub api_key: String,
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://identitytoolkit.googleapis.com/v1"),
            api_key: String::new(),
        }
    }
}

/// Account backend (secondary channel and user record) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountServiceConfig {
    /// REST base URL, without trailing slash
    pub base_url: String,
}

impl Default for AccountServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:5000/api"),
        }
    }
}

/// Complete channel configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelsConfig {
    /// Primary channel implementation
    pub sms_provider: SmsProviderKind,

    /// Account collaborator implementation
    pub account_backend: AccountBackend,

    /// Identity provider settings
    #[serde(default)]
    pub identity: IdentityProviderConfig,

    /// Account backend settings
    #[serde(default)]
    pub account: AccountServiceConfig,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            sms_provider: SmsProviderKind::IdentityToolkit,
            account_backend: AccountBackend::Http,
            identity: IdentityProviderConfig::default(),
            account: AccountServiceConfig::default(),
        }
    }
}

impl ChannelsConfig {
    /// Local doubles for both channels
    pub fn development() -> Self {
        Self {
            sms_provider: SmsProviderKind::Console,
            account_backend: AccountBackend::Memory,
            ..Default::default()
        }
    }

    /// Apply `SMS_PROVIDER`, `ACCOUNT_BACKEND`, `IDENTITY_TOOLKIT_*` and `ACCOUNT_SERVICE_URL`
    pub fn override_from_env(self) -> Self {
        Self {
            sms_provider: std::env::var("SMS_PROVIDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.sms_provider),
            account_backend: std::env::var("ACCOUNT_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.account_backend),
            identity: IdentityProviderConfig {
                base_url: std::env::var("IDENTITY_TOOLKIT_BASE_URL")
                    .unwrap_or(self.identity.base_url),
                api_key: std::env::var("IDENTITY_TOOLKIT_API_KEY").unwrap_or(self.identity.api_key),
            },
            account: AccountServiceConfig {
                base_url: std::env::var("ACCOUNT_SERVICE_URL").unwrap_or(self.account.base_url),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("firebase".parse::<SmsProviderKind>().unwrap(), SmsProviderKind::IdentityToolkit);
        assert_eq!("console".parse::<SmsProviderKind>().unwrap(), SmsProviderKind::Console);
        assert!("carrier-pigeon".parse::<SmsProviderKind>().is_err());
    }

    #[test]
    fn test_account_backend_from_str() {
        assert_eq!("HTTP".parse::<AccountBackend>().unwrap(), AccountBackend::Http);
        assert_eq!("memory".parse::<AccountBackend>().unwrap(), AccountBackend::Memory);
    }
}
