use reqwest::StatusCode;

use pv_core::errors::ChannelError;

use crate::account::http_account_service::AccountCall;
use crate::account::classify_account_response;

#[test]
fn test_verify_rejections_are_code_verdicts() {
    assert_eq!(
        classify_account_response(AccountCall::VerifyCode, StatusCode::BAD_REQUEST),
        ChannelError::InvalidCode
    );
    assert_eq!(
        classify_account_response(AccountCall::VerifyCode, StatusCode::GONE),
        ChannelError::Expired
    );
}

#[test]
fn test_send_rejection_is_not_a_code_verdict() {
    assert!(matches!(
        classify_account_response(AccountCall::SendCode, StatusCode::BAD_REQUEST),
        ChannelError::ConfigurationError(_)
    ));
}

#[test]
fn test_capacity_failures() {
    assert!(matches!(
        classify_account_response(AccountCall::SendCode, StatusCode::TOO_MANY_REQUESTS),
        ChannelError::RateLimited(_)
    ));
    assert!(matches!(
        classify_account_response(AccountCall::UpdatePhone, StatusCode::BAD_GATEWAY),
        ChannelError::TransientUnavailable(_)
    ));
}

#[test]
fn test_credential_rejection_needs_an_operator() {
    assert!(matches!(
        classify_account_response(AccountCall::UpdatePhone, StatusCode::UNAUTHORIZED),
        ChannelError::ConfigurationError(_)
    ));
}
