//! In-memory account backend for development and tests

use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use pv_core::domain::value_objects::PhoneNumber;
use pv_core::errors::ChannelError;
use pv_core::services::verification::AccountService;

use crate::sms::console_sms::generate_code;

#[derive(Default)]
struct Records {
    codes: HashMap<String, String>,
    verified: HashSet<String>,
}

/// Keeps internal codes and verified phones in process memory
pub struct InMemoryAccountService {
    code_length: usize,
    records: Mutex<Records>,
}

impl InMemoryAccountService {
    pub fn new(code_length: usize) -> Self {
        Self {
            code_length,
            records: Mutex::new(Records::default()),
        }
    }

    /// Pending internal code for `phone`
    pub fn code_for(&self, phone: &str) -> Option<String> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.codes.get(phone).cloned())
    }

    pub fn is_verified(&self, phone: &str) -> bool {
        self.records
            .lock()
            .map(|records| records.verified.contains(phone))
            .unwrap_or(false)
    }

    fn records(&self) -> Result<MutexGuard<'_, Records>, ChannelError> {
        self.records
            .lock()
            .map_err(|_| ChannelError::TransientUnavailable("account store poisoned".to_string()))
    }
}

#[async_trait]
impl AccountService for InMemoryAccountService {
    async fn issue_internal_code(&self, phone: &PhoneNumber) -> Result<String, ChannelError> {
        let code = generate_code(self.code_length);
        info!(
            phone = %phone.masked(),
            code = %code,
            "[IN-MEMORY ACCOUNT] Internal verification code"
        );
        self.records()?.codes.insert(phone.as_str().to_string(), code);
        Ok(String::new())
    }

    async fn confirm_internal_code(
        &self,
        phone: &PhoneNumber,
        code: &str,
    ) -> Result<(), ChannelError> {
        let mut records = self.records()?;
        let expected = records
            .codes
            .get(phone.as_str())
            .ok_or(ChannelError::Expired)?;
        if !constant_time_eq(expected.as_bytes(), code.as_bytes()) {
            return Err(ChannelError::InvalidCode);
        }
        records.codes.remove(phone.as_str());
        Ok(())
    }

    async fn mark_phone_verified(&self, phone: &PhoneNumber) -> Result<(), ChannelError> {
        self.records()?.verified.insert(phone.as_str().to_string());
        Ok(())
    }
}
