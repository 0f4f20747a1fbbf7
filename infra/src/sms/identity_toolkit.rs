//! Identity Toolkit SMS provider
//!
//! Primary channel backed by the Identity Toolkit phone sign-in REST API:
//!
//! - `accounts:sendVerificationCode` sends the SMS and returns `sessionInfo`
//! - `accounts:signInWithPhoneNumber` confirms a code against `sessionInfo`
//!
//! Provider error codes are mapped onto [`ChannelError`] so the gateway can
//! decide between fallback, caller feedback and operator alerts.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use pv_core::domain::value_objects::PhoneNumber;
use pv_core::errors::ChannelError;
use pv_core::services::verification::{AntiAutomationToken, SmsProvider};
use pv_shared::config::IdentityProviderConfig;

use crate::{transport_error, InfrastructureError};

/// The API key travels in a header so it never appears in request URLs
const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Identity Toolkit provider configuration
#[derive(Debug, Clone)]
pub struct IdentityToolkitConfig {
    /// REST base URL, e.g. `https://identitytoolkit.googleapis.com/v1`
    pub base_url: String,
    /// Project web API key
    pub api_key: String,
    /// Timeout applied by the HTTP client itself
    pub request_timeout_secs: u64,
}

impl IdentityToolkitConfig {
    pub fn from_provider_config(
        config: &IdentityProviderConfig,
        request_timeout_secs: u64,
    ) -> Result<Self, InfrastructureError> {
        if config.api_key.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "IDENTITY_TOOLKIT_API_KEY not set".to_string(),
            ));
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_timeout_secs,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendVerificationCodeRequest<'a> {
    phone_number: &'a str,
    recaptcha_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendVerificationCodeResponse {
    session_info: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithPhoneNumberRequest<'a> {
    session_info: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: String,
}

/// Primary SMS provider over the Identity Toolkit REST API
pub struct IdentityToolkitSmsProvider {
    client: reqwest::Client,
    config: IdentityToolkitConfig,
}

impl IdentityToolkitSmsProvider {
    /// Create a new provider
    pub fn new(config: IdentityToolkitConfig) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            base_url = %config.base_url,
            "Identity Toolkit SMS provider initialized"
        );

        Ok(Self { client, config })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}", self.config.base_url, method)
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, ChannelError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(method))
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<R>()
                .await
                .map_err(|e| ChannelError::Network(format!("unreadable {} response: {}", method, e)));
        }

        let body = response.text().await.unwrap_or_default();
        let err = classify_provider_error(status.as_u16(), &body);
        debug!(
            method,
            status = status.as_u16(),
            error = %err,
            "Identity Toolkit request rejected"
        );
        Err(err)
    }
}

#[async_trait]
impl SmsProvider for IdentityToolkitSmsProvider {
    fn provider_name(&self) -> &str {
        "identity-toolkit"
    }

    async fn issue(
        &self,
        phone: &PhoneNumber,
        token: &AntiAutomationToken,
    ) -> Result<String, ChannelError> {
        let request = SendVerificationCodeRequest {
            phone_number: phone.as_str(),
            recaptcha_token: token.as_str(),
        };

        let response: SendVerificationCodeResponse =
            self.call("sendVerificationCode", &request).await?;

        info!(
            phone = %phone.masked(),
            provider = self.provider_name(),
            "Verification SMS dispatched"
        );
        Ok(response.session_info)
    }

    async fn confirm(&self, handle: &str, code: &str) -> Result<(), ChannelError> {
        let request = SignInWithPhoneNumberRequest {
            session_info: handle,
            code,
        };

        let _: serde_json::Value = self.call("signInWithPhoneNumber", &request).await?;
        Ok(())
    }
}

/// Leading error code of a provider error message
///
/// Messages look like `INVALID_CODE` or `TOO_MANY_ATTEMPTS_TRY_LATER : Try again later`.
pub fn extract_error_code(body: &str) -> Option<String> {
    let parsed: ProviderErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .message
        .split(|c: char| c == ':' || c.is_whitespace())
        .find(|part| !part.is_empty())
        .map(str::to_string)
}

/// Map a non-success provider response onto the channel taxonomy
pub fn classify_provider_error(status: u16, body: &str) -> ChannelError {
    let code = extract_error_code(body);

    match code.as_deref() {
        Some("QUOTA_EXCEEDED") | Some("TOO_MANY_ATTEMPTS_TRY_LATER") => {
            ChannelError::RateLimited(code.unwrap_or_default())
        }
        Some("INVALID_CODE") | Some("INVALID_SESSION_INFO") => ChannelError::InvalidCode,
        Some("SESSION_EXPIRED") | Some("CODE_EXPIRED") => ChannelError::Expired,
        Some(
            "API_KEY_INVALID"
            | "OPERATION_NOT_ALLOWED"
            | "PROJECT_NOT_FOUND"
            | "INVALID_APP_CREDENTIAL"
            | "INVALID_PHONE_NUMBER",
        ) => ChannelError::ConfigurationError(code.unwrap_or_default()),
        // Stale or missing token: the client solves the check again.
        Some("CAPTCHA_CHECK_FAILED" | "MISSING_RECAPTCHA_TOKEN") => {
            ChannelError::AntiAutomation(code.unwrap_or_default())
        }
        _ => match status {
            429 => ChannelError::RateLimited(format!("HTTP {}", status)),
            500..=599 => ChannelError::TransientUnavailable(format!("HTTP {}", status)),
            _ => {
                warn!(
                    status,
                    code = code.as_deref().unwrap_or(""),
                    event = "unrecognized_provider_error",
                    "Unrecognized Identity Toolkit error"
                );
                ChannelError::ConfigurationError(format!(
                    "unexpected provider response HTTP {} {}",
                    status,
                    code.unwrap_or_default()
                ))
            }
        },
    }
}
