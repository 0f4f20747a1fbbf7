//! Verification sessions
//!
//! Each session owns one orchestrator and its anti-automation token slot.
//! Sessions are kept in memory and evicted after a period of inactivity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{MutexGuard, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use pv_core::services::verification::{
    AccountService, ChannelGateway, SmsProvider, VerificationOrchestrator,
    VerificationServiceConfig,
};
use pv_infra::{ChannelFactory, ClientTokenSlot};

/// Source of the channel collaborators used by new sessions
pub trait ChannelSource: Send + Sync {
    fn sms_provider(&self) -> Arc<dyn SmsProvider>;

    /// Account backend acting with the caller's bearer credentials
    fn account_service(&self, bearer: Option<String>) -> Arc<dyn AccountService>;
}

impl ChannelSource for ChannelFactory {
    fn sms_provider(&self) -> Arc<dyn SmsProvider> {
        ChannelFactory::sms_provider(self)
    }

    fn account_service(&self, bearer: Option<String>) -> Arc<dyn AccountService> {
        ChannelFactory::account_service(self, bearer)
    }
}

/// One caller's verification flow
pub struct VerificationSession {
    pub id: Uuid,
    pub orchestrator: VerificationOrchestrator,
    pub anti_automation: Arc<ClientTokenSlot>,
    busy: tokio::sync::Mutex<()>,
    last_seen: Mutex<Instant>,
}

impl VerificationSession {
    /// Claim the session for one request
    ///
    /// Returns `None` while another request of the same session is running.
    pub fn try_begin(&self) -> Option<MutexGuard<'_, ()>> {
        self.busy.try_lock().ok()
    }

    pub fn touch(&self) {
        if let Ok(mut last_seen) = self.last_seen.lock() {
            *last_seen = Instant::now();
        }
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .map(|last_seen| last_seen.elapsed())
            .unwrap_or_default()
    }
}

/// In-memory session table
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<VerificationSession>>>,
    channels: Arc<dyn ChannelSource>,
    config: VerificationServiceConfig,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(
        channels: Arc<dyn ChannelSource>,
        config: VerificationServiceConfig,
        idle_ttl: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            channels,
            config,
            idle_ttl,
        }
    }

    /// Start a new session acting with `bearer` credentials
    pub async fn create(&self, bearer: Option<String>) -> Arc<VerificationSession> {
        let anti_automation = Arc::new(ClientTokenSlot::new());
        let accounts = self.channels.account_service(bearer);
        let gateway = ChannelGateway::from_collaborators(
            self.channels.sms_provider(),
            anti_automation.clone(),
            accounts.clone(),
        );

        let session = Arc::new(VerificationSession {
            id: Uuid::new_v4(),
            orchestrator: VerificationOrchestrator::new(self.config.clone(), gateway, accounts),
            anti_automation,
            busy: tokio::sync::Mutex::new(()),
            last_seen: Mutex::new(Instant::now()),
        });

        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());

        info!(
            session_id = %session.id,
            event = "session_created",
            "Verification session created"
        );
        session
    }

    /// Look up a session and mark it as active
    pub async fn get(&self, id: &Uuid) -> Option<Arc<VerificationSession>> {
        let session = self.sessions.read().await.get(id).cloned();
        if let Some(session) = &session {
            session.touch();
        }
        session
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop sessions idle for longer than the configured TTL
    pub async fn sweep_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.idle_for() < self.idle_ttl);
        let evicted = before - sessions.len();

        if evicted > 0 {
            info!(
                evicted,
                remaining = sessions.len(),
                event = "sessions_evicted",
                "Evicted idle verification sessions"
            );
        } else {
            debug!(remaining = sessions.len(), "No idle verification sessions");
        }
        evicted
    }
}

/// Periodically evict idle sessions
pub fn spawn_session_sweeper(
    registry: Arc<SessionRegistry>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            registry.sweep_idle().await;
        }
    })
}
