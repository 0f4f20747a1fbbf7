//! Per-call deadline for channel collaborators
//!
//! Every provider and account-backend call is bounded. A call that does not
//! finish in time is reported as `TransientUnavailable`, which lets the
//! gateway fall back from the primary channel.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use pv_core::domain::value_objects::PhoneNumber;
use pv_core::errors::ChannelError;
use pv_core::services::verification::{AccountService, AntiAutomationToken, SmsProvider};

/// Wraps a collaborator and bounds each of its calls by `limit`
pub struct Deadline<T: ?Sized> {
    inner: Arc<T>,
    limit: Duration,
}

impl<T: ?Sized> Deadline<T> {
    pub fn new(inner: Arc<T>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn within<R, F>(&self, operation: &'static str, call: F) -> Result<R, ChannelError>
    where
        F: Future<Output = Result<R, ChannelError>> + Send,
    {
        match tokio::time::timeout(self.limit, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.limit.as_millis() as u64,
                    event = "channel_timeout",
                    "Channel call exceeded its deadline"
                );
                Err(ChannelError::TransientUnavailable(format!(
                    "{} timed out after {:?}",
                    operation, self.limit
                )))
            }
        }
    }
}

#[async_trait]
impl<T: SmsProvider + ?Sized> SmsProvider for Deadline<T> {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    async fn issue(
        &self,
        phone: &PhoneNumber,
        token: &AntiAutomationToken,
    ) -> Result<String, ChannelError> {
        self.within("sms_issue", self.inner.issue(phone, token)).await
    }

    async fn confirm(&self, handle: &str, code: &str) -> Result<(), ChannelError> {
        self.within("sms_confirm", self.inner.confirm(handle, code))
            .await
    }
}

#[async_trait]
impl<T: AccountService + ?Sized> AccountService for Deadline<T> {
    async fn issue_internal_code(&self, phone: &PhoneNumber) -> Result<String, ChannelError> {
        self.within("account_issue", self.inner.issue_internal_code(phone))
            .await
    }

    async fn confirm_internal_code(
        &self,
        phone: &PhoneNumber,
        code: &str,
    ) -> Result<(), ChannelError> {
        self.within("account_confirm", self.inner.confirm_internal_code(phone, code))
            .await
    }

    async fn mark_phone_verified(&self, phone: &PhoneNumber) -> Result<(), ChannelError> {
        self.within("account_update", self.inner.mark_phone_verified(phone))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pv_core::services::verification::PhoneNormalizer;

    struct SlowProvider {
        delay: Duration,
    }

    #[async_trait]
    impl SmsProvider for SlowProvider {
        fn provider_name(&self) -> &str {
            "slow"
        }

        async fn issue(
            &self,
            _phone: &PhoneNumber,
            _token: &AntiAutomationToken,
        ) -> Result<String, ChannelError> {
            tokio::time::sleep(self.delay).await;
            Ok("session".to_string())
        }

        async fn confirm(&self, _handle: &str, _code: &str) -> Result<(), ChannelError> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }
    }

    fn phone() -> PhoneNumber {
        PhoneNormalizer::default().normalize("0100000000").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_becomes_transient_unavailable() {
        let provider = Deadline::new(
            Arc::new(SlowProvider {
                delay: Duration::from_secs(30),
            }),
            Duration::from_secs(10),
        );

        let err = provider
            .issue(&phone(), &AntiAutomationToken::new("t"))
            .await
            .unwrap_err();

        assert!(matches!(err, ChannelError::TransientUnavailable(_)));
        assert!(err.triggers_fallback());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_call_passes_through() {
        let provider = Deadline::new(
            Arc::new(SlowProvider {
                delay: Duration::from_secs(1),
            }),
            Duration::from_secs(10),
        );

        assert_eq!(provider.confirm("session", "123456").await, Ok(()));
        assert_eq!(provider.provider_name(), "slow");
    }
}
