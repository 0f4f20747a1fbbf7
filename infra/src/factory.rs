//! Collaborator construction driven by `ChannelsConfig`

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use pv_core::services::verification::{AccountService, SmsProvider};
use pv_shared::config::{
    AccountBackend, ChannelsConfig, Environment, SmsProviderKind, VerificationConfig,
};

use crate::account::{HttpAccountService, InMemoryAccountService};
use crate::deadline::Deadline;
use crate::sms::{ConsoleSmsProvider, IdentityToolkitConfig, IdentityToolkitSmsProvider};
use crate::InfrastructureError;

/// Extra time granted to the HTTP clients beyond the channel deadline
///
/// The `Deadline` decorator owns the timeout; the client limit only backs it up.
const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(2);

pub(crate) fn client_timeout(deadline: Duration) -> Duration {
    deadline + CLIENT_TIMEOUT_SLACK
}

enum AccountBackendHandle {
    Http { client: reqwest::Client, base_url: String },
    Memory(Arc<InMemoryAccountService>),
}

/// Builds the channel collaborators shared by every verification session
///
/// The SMS provider is process-wide. Account services are created per
/// session so each one carries the caller's bearer credentials.
pub struct ChannelFactory {
    sms_provider: Arc<dyn SmsProvider>,
    accounts: AccountBackendHandle,
    timeout: Duration,
}

impl ChannelFactory {
    /// Create the factory from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ChannelFactory)` - Collaborators ready for use
    /// * `Err(InfrastructureError)` - The primary provider is misconfigured, or a
    ///   development double is selected in an environment that forbids it
    pub fn from_config(
        environment: Environment,
        channels: &ChannelsConfig,
        verification: &VerificationConfig,
    ) -> Result<Self, InfrastructureError> {
        let timeout = Duration::from_secs(verification.channel_timeout_seconds);
        let client_timeout = client_timeout(timeout);

        let provider: Arc<dyn SmsProvider> = match channels.sms_provider {
            SmsProviderKind::IdentityToolkit => {
                let config = IdentityToolkitConfig::from_provider_config(
                    &channels.identity,
                    client_timeout.as_secs(),
                )?;
                Arc::new(IdentityToolkitSmsProvider::new(config)?)
            }
            SmsProviderKind::Console => {
                ensure_debug(environment, "console SMS provider")?;
                warn!("Console SMS provider selected; codes are written to the log");
                Arc::new(ConsoleSmsProvider::new(verification.code_length))
            }
        };

        let accounts = match channels.account_backend {
            AccountBackend::Http => AccountBackendHandle::Http {
                client: reqwest::Client::builder().timeout(client_timeout).build()?,
                base_url: channels.account.base_url.clone(),
            },
            AccountBackend::Memory => {
                ensure_debug(environment, "in-memory account backend")?;
                warn!("In-memory account backend selected; user records are not persisted");
                AccountBackendHandle::Memory(Arc::new(InMemoryAccountService::new(
                    verification.code_length,
                )))
            }
        };

        info!(
            sms_provider = provider.provider_name(),
            timeout_secs = timeout.as_secs(),
            "Verification channels configured"
        );

        Ok(Self {
            sms_provider: Arc::new(Deadline::new(provider, timeout)),
            accounts,
            timeout,
        })
    }

    /// Primary-channel provider, bounded by the channel deadline
    pub fn sms_provider(&self) -> Arc<dyn SmsProvider> {
        self.sms_provider.clone()
    }

    /// Account backend for one session, bounded by the channel deadline
    pub fn account_service(&self, bearer: Option<String>) -> Arc<dyn AccountService> {
        let inner: Arc<dyn AccountService> = match &self.accounts {
            AccountBackendHandle::Http { client, base_url } => Arc::new(HttpAccountService::new(
                client.clone(),
                base_url.clone(),
                bearer,
            )),
            AccountBackendHandle::Memory(accounts) => accounts.clone(),
        };
        Arc::new(Deadline::new(inner, self.timeout))
    }

    /// The in-memory backend, when selected
    pub fn memory_accounts(&self) -> Option<Arc<InMemoryAccountService>> {
        match &self.accounts {
            AccountBackendHandle::Memory(accounts) => Some(accounts.clone()),
            AccountBackendHandle::Http { .. } => None,
        }
    }
}

/// Development doubles log plaintext codes
fn ensure_debug(environment: Environment, double: &str) -> Result<(), InfrastructureError> {
    if environment.is_debug() {
        Ok(())
    } else {
        Err(InfrastructureError::Config(format!(
            "{} is not allowed in {}",
            double, environment
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_channels() {
        let factory = ChannelFactory::from_config(
            Environment::Development,
            &ChannelsConfig::development(),
            &VerificationConfig::default(),
        )
        .unwrap();

        assert_eq!(factory.sms_provider().provider_name(), "console");
        assert!(factory.memory_accounts().is_some());
    }

    #[test]
    fn test_production_refuses_development_doubles() {
        let result = ChannelFactory::from_config(
            Environment::Production,
            &ChannelsConfig::development(),
            &VerificationConfig::default(),
        );
        assert!(matches!(result, Err(InfrastructureError::Config(_))));

        let mut channels = ChannelsConfig::default();
        channels.identity.api_key = "test-key".to_string();
        channels.account_backend = AccountBackend::Memory;
        let result =
            ChannelFactory::from_config(Environment::Production, &channels, &VerificationConfig::default());
        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }

    #[test]
    fn test_staging_allows_development_doubles() {
        let factory = ChannelFactory::from_config(
            Environment::Staging,
            &ChannelsConfig::development(),
            &VerificationConfig::default(),
        );
        assert!(factory.is_ok());
    }

    #[test]
    fn test_client_timeout_outlasts_deadline() {
        let deadline = Duration::from_secs(VerificationConfig::default().channel_timeout_seconds);
        assert!(client_timeout(deadline) > deadline);
    }

    #[test]
    fn test_identity_toolkit_requires_api_key() {
        let mut channels = ChannelsConfig::default();
        channels.identity.api_key = String::new();

        let result =
            ChannelFactory::from_config(Environment::Production, &channels, &VerificationConfig::default());

        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }

    #[test]
    fn test_http_backend_has_no_memory_accounts() {
        let mut channels = ChannelsConfig::default();
        channels.identity.api_key = "test-key".to_string();

        let factory =
            ChannelFactory::from_config(Environment::Production, &channels, &VerificationConfig::default())
                .unwrap();

        assert_eq!(factory.sms_provider().provider_name(), "identity-toolkit");
        assert!(factory.memory_accounts().is_none());
    }
}
