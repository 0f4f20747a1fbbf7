//! Mapping of verification errors onto HTTP responses
//!
//! | Error | Status |
//! |-------|--------|
//! | InvalidFormat, InvalidCode, AntiAutomationRequired, request validation | 400 |
//! | CooldownActive | 429 with `Retry-After` |
//! | AttemptsExhausted, Expired, NoActiveChallenge | 410 |
//! | ChannelMismatch, Cancelled, NotVerified, busy session | 409 |
//! | Unknown session | 404 |
//! | TransientUnavailable | 503 |
//! | RecordUpdateFailed | 502 |
//! | ConfigurationError | 500 |

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use validator::ValidationErrors;

use pv_core::errors::VerificationError;
use pv_shared::errors::{error_codes, ErrorResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("Invalid request data")]
    Validation(#[from] ValidationErrors),

    #[error("Verification session not found. Please request a new code")]
    SessionNotFound,

    #[error("Another request for this verification session is still in progress")]
    SessionBusy,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Verification(err) => verification_status(err),
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::SessionNotFound => StatusCode::NOT_FOUND,
            ApiError::SessionBusy => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());

        let body = match self {
            ApiError::Verification(err) => {
                if let VerificationError::CooldownActive { remaining_seconds } = err {
                    builder.insert_header((header::RETRY_AFTER, remaining_seconds.to_string()));
                }
                ErrorResponse::from(err)
            }
            ApiError::Validation(errors) => {
                let fields: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|field| field.to_string())
                    .collect();
                ErrorResponse::new(error_codes::BAD_REQUEST, self.to_string())
                    .add_detail("fields", fields)
            }
            ApiError::SessionNotFound => {
                ErrorResponse::new(error_codes::SESSION_NOT_FOUND, self.to_string())
            }
            ApiError::SessionBusy => ErrorResponse::new(error_codes::SESSION_BUSY, self.to_string()),
        };

        builder.json(body)
    }
}

fn verification_status(err: &VerificationError) -> StatusCode {
    match err {
        VerificationError::InvalidFormat(_)
        | VerificationError::InvalidCode { .. }
        | VerificationError::AntiAutomationRequired => StatusCode::BAD_REQUEST,
        VerificationError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
        VerificationError::AttemptsExhausted
        | VerificationError::Expired
        | VerificationError::NoActiveChallenge => StatusCode::GONE,
        VerificationError::ChannelMismatch { .. }
        | VerificationError::Cancelled
        | VerificationError::NotVerified => StatusCode::CONFLICT,
        VerificationError::TransientUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        VerificationError::RecordUpdateFailed(_) => StatusCode::BAD_GATEWAY,
        VerificationError::ConfigurationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pv_core::Channel;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(VerificationError::CooldownActive {
                remaining_seconds: 10
            })
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::from(VerificationError::Expired).status_code(),
            StatusCode::GONE
        );
        assert_eq!(
            ApiError::from(VerificationError::ConfigurationError {
                channel: Channel::Primary,
                message: "API_KEY_INVALID".to_string()
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::SessionBusy.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_cooldown_sets_retry_after() {
        let response = ApiError::from(VerificationError::CooldownActive {
            remaining_seconds: 42,
        })
        .error_response();

        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "42"
        );
    }
}
