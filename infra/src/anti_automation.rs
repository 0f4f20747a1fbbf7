//! Client-supplied anti-automation tokens
//!
//! The browser solves the challenge widget and sends the resulting token
//! with each code request. The slot hands that token to the primary channel
//! exactly once.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;

use pv_core::errors::ChannelError;
use pv_core::services::verification::{AntiAutomationChallenge, AntiAutomationToken};

/// Holds at most one unused token for a session
#[derive(Default)]
pub struct ClientTokenSlot {
    token: Mutex<Option<String>>,
}

impl ClientTokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the token sent with the current request; blank tokens clear the slot
    pub fn supply(&self, token: Option<&str>) {
        let token = token.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
        if let Ok(mut slot) = self.token.lock() {
            *slot = token;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.token.lock().map(|slot| slot.is_none()).unwrap_or(true)
    }
}

#[async_trait]
impl AntiAutomationChallenge for ClientTokenSlot {
    async fn acquire(&self) -> Result<AntiAutomationToken, ChannelError> {
        let token = self
            .token
            .lock()
            .map_err(|_| ChannelError::AntiAutomation("token slot poisoned".to_string()))?
            .take();

        token.map(AntiAutomationToken::new).ok_or_else(|| {
            ChannelError::AntiAutomation("no anti-automation token supplied".to_string())
        })
    }

    async fn invalidate(&self, token: &AntiAutomationToken) {
        if let Ok(mut slot) = self.token.lock() {
            if slot.as_deref() == Some(token.as_str()) {
                *slot = None;
            }
        }
        debug!("Anti-automation token invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_is_single_use() {
        let slot = ClientTokenSlot::new();
        slot.supply(Some("solved-token"));

        let token = slot.acquire().await.unwrap();
        assert_eq!(token.as_str(), "solved-token");
        assert!(slot.acquire().await.is_err());
    }

    #[tokio::test]
    async fn test_missing_token_is_an_anti_automation_error() {
        let slot = ClientTokenSlot::new();
        slot.supply(Some("   "));

        assert!(slot.is_empty());
        assert!(matches!(
            slot.acquire().await,
            Err(ChannelError::AntiAutomation(_))
        ));
    }

    #[tokio::test]
    async fn test_invalidate_clears_matching_token_only() {
        let slot = ClientTokenSlot::new();
        slot.supply(Some("fresh"));

        slot.invalidate(&AntiAutomationToken::new("stale")).await;
        assert!(!slot.is_empty());

        slot.invalidate(&AntiAutomationToken::new("fresh")).await;
        assert!(slot.is_empty());
    }
}
