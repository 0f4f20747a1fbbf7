//! Error classification and API error codes for verification errors

use pv_shared::errors::{error_codes, ErrorResponse};

use super::VerificationError;

/// How a caller is expected to react to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Shown verbatim; the user fixes the input
    UserCorrectable,
    /// Channel capacity problem; one fallback per request already happened
    TransientChannel,
    /// The user must restart from phone entry
    Exhaustion,
    /// Defect or attack signal
    Integrity,
    /// Requires operator action; users see a generic message
    OperatorFatal,
    /// Session flow conflicts (cancelled, wrong state)
    Flow,
}

impl VerificationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VerificationError::InvalidFormat(_)
            | VerificationError::InvalidCode { .. }
            | VerificationError::CooldownActive { .. }
            | VerificationError::AntiAutomationRequired => ErrorCategory::UserCorrectable,
            VerificationError::TransientUnavailable { .. } => ErrorCategory::TransientChannel,
            VerificationError::AttemptsExhausted
            | VerificationError::Expired
            | VerificationError::NoActiveChallenge => ErrorCategory::Exhaustion,
            VerificationError::ChannelMismatch { .. } => ErrorCategory::Integrity,
            VerificationError::ConfigurationError { .. } => ErrorCategory::OperatorFatal,
            VerificationError::Cancelled
            | VerificationError::NotVerified
            | VerificationError::RecordUpdateFailed(_) => ErrorCategory::Flow,
        }
    }

    /// Stable code for programmatic handling by clients
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationError::InvalidFormat(_) => error_codes::PHONE_INVALID,
            VerificationError::CooldownActive { .. } => error_codes::COOLDOWN_ACTIVE,
            VerificationError::AntiAutomationRequired => error_codes::ANTI_AUTOMATION_REQUIRED,
            VerificationError::TransientUnavailable { .. } => error_codes::CHANNEL_UNAVAILABLE,
            VerificationError::ConfigurationError { .. } => error_codes::SERVICE_MISCONFIGURED,
            VerificationError::InvalidCode { .. } => error_codes::VERIFICATION_CODE_INVALID,
            VerificationError::AttemptsExhausted => error_codes::ATTEMPTS_EXHAUSTED,
            VerificationError::Expired => error_codes::VERIFICATION_CODE_EXPIRED,
            VerificationError::NoActiveChallenge => error_codes::NO_ACTIVE_CHALLENGE,
            VerificationError::ChannelMismatch { .. } => error_codes::CHANNEL_MISMATCH,
            VerificationError::Cancelled => error_codes::CANCELLED,
            VerificationError::NotVerified => error_codes::NOT_VERIFIED,
            VerificationError::RecordUpdateFailed(_) => error_codes::RECORD_UPDATE_FAILED,
        }
    }

    /// Message safe to show to end users
    ///
    /// Integrity and operator-fatal errors never expose channel details.
    pub fn user_message(&self) -> String {
        match self {
            VerificationError::ChannelMismatch { .. } => {
                "Verification failed. Please request a new code".to_string()
            }
            VerificationError::TransientUnavailable { .. } => {
                "Verification service temporarily unavailable. Please try again later".to_string()
            }
            VerificationError::RecordUpdateFailed(_) => {
                "Your phone was verified but your profile could not be updated yet".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<&VerificationError> for ErrorResponse {
    fn from(err: &VerificationError) -> Self {
        let response = ErrorResponse::new(err.error_code(), err.user_message());
        match err {
            VerificationError::CooldownActive { remaining_seconds } => {
                response.add_detail("retry_after", remaining_seconds)
            }
            VerificationError::InvalidCode { attempts_remaining } => {
                response.add_detail("attempts_remaining", attempts_remaining)
            }
            _ => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Channel;
    use crate::errors::{ChannelError, PhoneFormatError};

    #[test]
    fn test_categories() {
        assert_eq!(
            VerificationError::from(PhoneFormatError::UnsupportedPrefix).category(),
            ErrorCategory::UserCorrectable
        );
        assert_eq!(VerificationError::AttemptsExhausted.category(), ErrorCategory::Exhaustion);
        assert_eq!(
            VerificationError::ChannelMismatch {
                issued_by: Channel::Primary,
                confirming: Channel::Secondary
            }
            .category(),
            ErrorCategory::Integrity
        );
    }

    #[test]
    fn test_configuration_error_is_generic_for_users() {
        let err = VerificationError::from_issue_failure(
            Channel::Primary,
            ChannelError::ConfigurationError("API_KEY_INVALID".to_string()),
        );
        assert_eq!(err.category(), ErrorCategory::OperatorFatal);
        assert!(!err.user_message().contains("API_KEY_INVALID"));
    }

    #[test]
    fn test_issue_failure_mapping() {
        assert!(matches!(
            VerificationError::from_issue_failure(
                Channel::Secondary,
                ChannelError::RateLimited("quota".into())
            ),
            VerificationError::TransientUnavailable { .. }
        ));
        assert_eq!(
            VerificationError::from_issue_failure(
                Channel::Primary,
                ChannelError::AntiAutomation("no token".into())
            ),
            VerificationError::AntiAutomationRequired
        );
    }

    #[test]
    fn test_error_response_details() {
        let response = ErrorResponse::from(&VerificationError::CooldownActive {
            remaining_seconds: 120,
        });
        assert_eq!(response.error, "COOLDOWN_ACTIVE");
        assert_eq!(
            response.details.unwrap()["retry_after"],
            serde_json::json!(120)
        );
    }
}
