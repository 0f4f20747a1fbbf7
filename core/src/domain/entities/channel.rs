//! Delivery channel identity and channel-scoped handles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The backend that issued (and must confirm) a code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Third-party SMS / identity provider
    Primary,
    /// Account backend's own code issuance
    Secondary,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Primary => "primary",
            Channel::Secondary => "secondary",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle returned by a channel on issuance
///
/// The handle remembers which channel produced it; a handle can only be
/// confirmed on that same channel.
#[derive(Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    issued_by: Channel,
    token: String,
}

impl ChannelHandle {
    pub fn new(issued_by: Channel, token: impl Into<String>) -> Self {
        Self {
            issued_by,
            token: token.into(),
        }
    }

    pub fn issued_by(&self) -> Channel {
        self.issued_by
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

// Provider session tokens are bearer-like; keep them out of logs.
impl fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("issued_by", &self.issued_by)
            .field("token", &"<redacted>")
            .finish()
    }
}
