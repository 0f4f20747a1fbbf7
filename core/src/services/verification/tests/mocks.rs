//! Mock collaborators for testing the verification service

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::domain::value_objects::PhoneNumber;
use crate::errors::ChannelError;
use crate::services::verification::{
    AccountService, AntiAutomationChallenge, AntiAutomationToken, ChannelGateway, Clock,
    SmsProvider, VerificationOrchestrator, VerificationServiceConfig,
};

/// Pauses a mock call until the test releases it
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wait until a call is parked on this gate
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn open(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Queue of scripted results; falls back to a default once drained
struct Script<T> {
    queued: Mutex<VecDeque<Result<T, ChannelError>>>,
}

impl<T> Script<T> {
    fn new() -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
        }
    }

    fn push(&self, result: Result<T, ChannelError>) {
        self.queued.lock().unwrap().push_back(result);
    }

    fn next_or(&self, default: impl FnOnce() -> Result<T, ChannelError>) -> Result<T, ChannelError> {
        self.queued.lock().unwrap().pop_front().unwrap_or_else(default)
    }
}

// Mock primary provider
pub struct MockSmsProvider {
    issue_script: Script<String>,
    confirm_script: Script<()>,
    pub issued_to: Mutex<Vec<String>>,
    pub confirmed: Mutex<Vec<(String, String)>>,
    issue_gate: Mutex<Option<Arc<Gate>>>,
    confirm_gate: Mutex<Option<Arc<Gate>>>,
}

impl MockSmsProvider {
    pub fn new() -> Self {
        Self {
            issue_script: Script::new(),
            confirm_script: Script::new(),
            issued_to: Mutex::new(Vec::new()),
            confirmed: Mutex::new(Vec::new()),
            issue_gate: Mutex::new(None),
            confirm_gate: Mutex::new(None),
        }
    }

    pub fn fail_issue(&self, error: ChannelError) {
        self.issue_script.push(Err(error));
    }

    pub fn fail_confirm(&self, error: ChannelError) {
        self.confirm_script.push(Err(error));
    }

    pub fn gate_issue(&self, gate: Arc<Gate>) {
        *self.issue_gate.lock().unwrap() = Some(gate);
    }

    pub fn gate_confirm(&self, gate: Arc<Gate>) {
        *self.confirm_gate.lock().unwrap() = Some(gate);
    }

    pub fn issue_calls(&self) -> usize {
        self.issued_to.lock().unwrap().len()
    }

    pub fn confirm_calls(&self) -> usize {
        self.confirmed.lock().unwrap().len()
    }
}

#[async_trait]
impl SmsProvider for MockSmsProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn issue(
        &self,
        phone: &PhoneNumber,
        _token: &AntiAutomationToken,
    ) -> Result<String, ChannelError> {
        let call = {
            let mut issued = self.issued_to.lock().unwrap();
            issued.push(phone.as_str().to_string());
            issued.len()
        };
        let gate = self.issue_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.issue_script.next_or(|| Ok(format!("session-{}", call)))
    }

    async fn confirm(&self, handle: &str, code: &str) -> Result<(), ChannelError> {
        self.confirmed
            .lock()
            .unwrap()
            .push((handle.to_string(), code.to_string()));
        let gate = self.confirm_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.confirm_script.next_or(|| Ok(()))
    }
}

// Mock anti-automation capability
#[derive(Default)]
pub struct MockAntiAutomation {
    pub unavailable: Mutex<bool>,
    pub acquired: Mutex<Vec<String>>,
    pub invalidated: Mutex<Vec<String>>,
}

impl MockAntiAutomation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self) {
        *self.unavailable.lock().unwrap() = true;
    }

    pub fn acquire_calls(&self) -> usize {
        self.acquired.lock().unwrap().len()
    }

    pub fn invalidate_calls(&self) -> usize {
        self.invalidated.lock().unwrap().len()
    }
}

#[async_trait]
impl AntiAutomationChallenge for MockAntiAutomation {
    async fn acquire(&self) -> Result<AntiAutomationToken, ChannelError> {
        if *self.unavailable.lock().unwrap() {
            return Err(ChannelError::AntiAutomation("widget not rendered".to_string()));
        }
        let mut acquired = self.acquired.lock().unwrap();
        let token = format!("token-{}", acquired.len() + 1);
        acquired.push(token.clone());
        Ok(AntiAutomationToken::new(token))
    }

    async fn invalidate(&self, token: &AntiAutomationToken) {
        self.invalidated
            .lock()
            .unwrap()
            .push(token.as_str().to_string());
    }
}

// Mock account backend
pub struct MockAccountService {
    issue_script: Script<String>,
    confirm_script: Script<()>,
    mark_script: Script<()>,
    pub issued_to: Mutex<Vec<String>>,
    pub confirmed: Mutex<Vec<(String, String)>>,
    pub marked: Mutex<Vec<String>>,
}

impl MockAccountService {
    pub fn new() -> Self {
        Self {
            issue_script: Script::new(),
            confirm_script: Script::new(),
            mark_script: Script::new(),
            issued_to: Mutex::new(Vec::new()),
            confirmed: Mutex::new(Vec::new()),
            marked: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_issue(&self, error: ChannelError) {
        self.issue_script.push(Err(error));
    }

    pub fn fail_confirm(&self, error: ChannelError) {
        self.confirm_script.push(Err(error));
    }

    pub fn fail_mark(&self, error: ChannelError) {
        self.mark_script.push(Err(error));
    }

    pub fn issue_calls(&self) -> usize {
        self.issued_to.lock().unwrap().len()
    }

    pub fn confirm_calls(&self) -> usize {
        self.confirmed.lock().unwrap().len()
    }

    pub fn mark_calls(&self) -> usize {
        self.marked.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountService for MockAccountService {
    async fn issue_internal_code(&self, phone: &PhoneNumber) -> Result<String, ChannelError> {
        self.issued_to
            .lock()
            .unwrap()
            .push(phone.as_str().to_string());
        self.issue_script.next_or(|| Ok(String::new()))
    }

    async fn confirm_internal_code(
        &self,
        phone: &PhoneNumber,
        code: &str,
    ) -> Result<(), ChannelError> {
        self.confirmed
            .lock()
            .unwrap()
            .push((phone.as_str().to_string(), code.to_string()));
        self.confirm_script.next_or(|| Ok(()))
    }

    async fn mark_phone_verified(&self, phone: &PhoneNumber) -> Result<(), ChannelError> {
        self.marked.lock().unwrap().push(phone.as_str().to_string());
        self.mark_script.next_or(|| Ok(()))
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance_secs(&self, seconds: i64) {
        self.advance(Duration::seconds(seconds));
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Orchestrator wired to fresh mocks
pub struct Harness {
    pub orchestrator: Arc<VerificationOrchestrator>,
    pub provider: Arc<MockSmsProvider>,
    pub anti_automation: Arc<MockAntiAutomation>,
    pub accounts: Arc<MockAccountService>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        let provider = Arc::new(MockSmsProvider::new());
        let anti_automation = Arc::new(MockAntiAutomation::new());
        let accounts = Arc::new(MockAccountService::new());
        let clock = Arc::new(ManualClock::new());

        let gateway = ChannelGateway::from_collaborators(
            provider.clone(),
            anti_automation.clone(),
            accounts.clone(),
        );
        let orchestrator = VerificationOrchestrator::new(
            VerificationServiceConfig::default(),
            gateway,
            accounts.clone(),
        )
        .with_clock(clock.clone());

        Self {
            orchestrator: Arc::new(orchestrator),
            provider,
            anti_automation,
            accounts,
            clock,
        }
    }
}

pub const PHONE: &str = "0100000000";
pub const CANONICAL: &str = "+20100000000";
pub const CODE: &str = "123456";
