use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use pv_core::Channel;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestCodeRequest {
    /// Phone number as typed by the user, national or international form
    /// Examples: "010 000 0000", "+20 10 000 0000"
    #[validate(length(min = 1, max = 32))]
    pub phone: String,

    /// Token produced by the client-side anti-automation widget
    #[validate(length(max = 4096))]
    pub anti_automation_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCodeResponse {
    pub session_id: String,
    pub channel_used: Channel,
    pub phone_masked: String,
    pub resend_after: u64, // seconds until a resend is allowed
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitCodeRequest {
    /// One-time code received by SMS
    #[validate(length(min = 1, max = 16))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitCodeResponse {
    pub verified: bool,
    pub channel: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_update_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownResponse {
    pub remaining_seconds: u64,
}
