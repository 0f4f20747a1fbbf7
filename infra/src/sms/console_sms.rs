//! Console SMS provider for local development
//!
//! Writes each code to the log instead of sending it. Sessions live in
//! memory and are removed once confirmed.

use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use pv_core::domain::value_objects::PhoneNumber;
use pv_core::errors::ChannelError;
use pv_core::services::verification::{AntiAutomationToken, SmsProvider};

/// Generate a numeric one-time code of `length` digits
pub(crate) fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Development provider that logs codes to the console
pub struct ConsoleSmsProvider {
    code_length: usize,
    sessions: Mutex<HashMap<String, String>>,
    latest_session: Mutex<Option<String>>,
}

impl ConsoleSmsProvider {
    pub fn new(code_length: usize) -> Self {
        Self {
            code_length,
            sessions: Mutex::new(HashMap::new()),
            latest_session: Mutex::new(None),
        }
    }

    /// Code of the most recently issued session that is still pending
    pub fn latest_code(&self) -> Option<String> {
        let session = self.latest_session.lock().ok()?.clone()?;
        self.code_for(&session)
    }

    /// Code issued for `session`, for tests and local tooling
    pub fn code_for(&self, session: &str) -> Option<String> {
        self.sessions
            .lock()
            .ok()
            .and_then(|sessions| sessions.get(session).cloned())
    }

    fn sessions(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, ChannelError> {
        self.sessions
            .lock()
            .map_err(|_| ChannelError::TransientUnavailable("console session store poisoned".to_string()))
    }
}

#[async_trait]
impl SmsProvider for ConsoleSmsProvider {
    fn provider_name(&self) -> &str {
        "console"
    }

    async fn issue(
        &self,
        phone: &PhoneNumber,
        _token: &AntiAutomationToken,
    ) -> Result<String, ChannelError> {
        let session = format!("console-{}", Uuid::new_v4());
        let code = generate_code(self.code_length);

        info!(
            phone = %phone.masked(),
            code = %code,
            "[CONSOLE SMS] Verification code"
        );

        self.sessions()?.insert(session.clone(), code);
        if let Ok(mut latest) = self.latest_session.lock() {
            *latest = Some(session.clone());
        }
        Ok(session)
    }

    async fn confirm(&self, handle: &str, code: &str) -> Result<(), ChannelError> {
        let mut sessions = self.sessions()?;
        let expected = sessions.get(handle).ok_or(ChannelError::Expired)?;
        if !constant_time_eq(expected.as_bytes(), code.as_bytes()) {
            return Err(ChannelError::InvalidCode);
        }
        sessions.remove(handle);
        Ok(())
    }
}
