//! Account backend over HTTP
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `POST /users/phone/send-code` issues an internal code
//! - `POST /users/phone/verify-code` checks an internal code
//! - `PATCH /users/me/phone` sets `phone_number` and `phone_verified`
//!
//! Requests carry the caller's bearer credentials when the session has them.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pv_core::domain::value_objects::PhoneNumber;
use pv_core::errors::ChannelError;
use pv_core::services::verification::AccountService;

use crate::transport_error;

#[derive(Serialize)]
struct PhoneRequest<'a> {
    phone: &'a str,
}

#[derive(Serialize)]
struct VerifyCodeRequest<'a> {
    phone: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct UpdatePhoneRequest<'a> {
    phone_number: &'a str,
    phone_verified: bool,
}

#[derive(Deserialize, Default)]
struct SendCodeResponse {
    #[serde(default, alias = "verificationId", alias = "verification_id")]
    handle: Option<String>,
}

/// Which call produced a response; code verdicts only make sense for verify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountCall {
    SendCode,
    VerifyCode,
    UpdatePhone,
}

/// Map a non-success account backend status onto the channel taxonomy
pub fn classify_account_response(call: AccountCall, status: StatusCode) -> ChannelError {
    match status.as_u16() {
        400 | 422 if call == AccountCall::VerifyCode => ChannelError::InvalidCode,
        410 if call == AccountCall::VerifyCode => ChannelError::Expired,
        401 | 403 => ChannelError::ConfigurationError(format!(
            "account backend rejected credentials (HTTP {})",
            status.as_u16()
        )),
        429 => ChannelError::RateLimited(format!("HTTP {}", status.as_u16())),
        500..=599 => ChannelError::TransientUnavailable(format!("HTTP {}", status.as_u16())),
        code => ChannelError::ConfigurationError(format!(
            "unexpected account backend response HTTP {}",
            code
        )),
    }
}

/// Account service client bound to one caller's credentials
#[derive(Clone)]
pub struct HttpAccountService {
    client: Client,
    base_url: String,
    bearer: Option<String>,
}

impl HttpAccountService {
    /// Create a client sharing `client`'s connection pool
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `base_url` - Account backend API root, e.g. `http://localhost:5000/api`
    /// * `bearer` - Caller session credentials, forwarded as `Authorization: Bearer`
    pub fn new(client: Client, base_url: impl Into<String>, bearer: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        call: AccountCall,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, ChannelError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let err = classify_account_response(call, status);
            debug!(
                call = ?call,
                status = status.as_u16(),
                error = %err,
                "Account backend request rejected"
            );
            Err(err)
        }
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn issue_internal_code(&self, phone: &PhoneNumber) -> Result<String, ChannelError> {
        let request = self
            .client
            .post(self.url("/users/phone/send-code"))
            .json(&PhoneRequest {
                phone: phone.as_str(),
            });
        let response = self.send(AccountCall::SendCode, request).await?;

        // An empty or non-JSON body is valid: the backend keys codes by phone.
        let body = response.text().await.unwrap_or_default();
        let parsed: SendCodeResponse = serde_json::from_str(&body).unwrap_or_default();

        info!(
            phone = %phone.masked(),
            "Account backend issued an internal verification code"
        );
        Ok(parsed.handle.unwrap_or_default())
    }

    async fn confirm_internal_code(
        &self,
        phone: &PhoneNumber,
        code: &str,
    ) -> Result<(), ChannelError> {
        let request = self
            .client
            .post(self.url("/users/phone/verify-code"))
            .json(&VerifyCodeRequest {
                phone: phone.as_str(),
                code,
            });
        self.send(AccountCall::VerifyCode, request).await?;
        Ok(())
    }

    async fn mark_phone_verified(&self, phone: &PhoneNumber) -> Result<(), ChannelError> {
        let request = self
            .client
            .patch(self.url("/users/me/phone"))
            .json(&UpdatePhoneRequest {
                phone_number: phone.as_str(),
                phone_verified: true,
            });
        self.send(AccountCall::UpdatePhone, request).await?;
        Ok(())
    }
}
