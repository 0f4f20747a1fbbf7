//! Application state shared by all workers

pub mod session;

pub use session::{spawn_session_sweeper, ChannelSource, SessionRegistry, VerificationSession};

use std::sync::Arc;

/// Application state that holds shared services
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    /// Header carrying the verification session id
    pub session_header: String,
}

impl AppState {
    pub fn new(sessions: Arc<SessionRegistry>, session_header: impl Into<String>) -> Self {
        Self {
            sessions,
            session_header: session_header.into(),
        }
    }
}
