use std::sync::Arc;

use super::mocks::{MockAccountService, MockAntiAutomation, MockSmsProvider};
use crate::domain::entities::{Channel, ChannelHandle};
use crate::errors::ChannelError;
use crate::services::verification::{
    ChannelGateway, CodeChannel, PhoneNormalizer, PrimaryChannel, SecondaryChannel,
};

struct Fixture {
    gateway: ChannelGateway,
    provider: Arc<MockSmsProvider>,
    anti_automation: Arc<MockAntiAutomation>,
    accounts: Arc<MockAccountService>,
}

fn fixture() -> Fixture {
    let provider = Arc::new(MockSmsProvider::new());
    let anti_automation = Arc::new(MockAntiAutomation::new());
    let accounts = Arc::new(MockAccountService::new());
    let gateway = ChannelGateway::from_collaborators(
        provider.clone(),
        anti_automation.clone(),
        accounts.clone(),
    );
    Fixture {
        gateway,
        provider,
        anti_automation,
        accounts,
    }
}

fn phone() -> crate::domain::value_objects::PhoneNumber {
    PhoneNormalizer::default().normalize("0100000000").unwrap()
}

#[tokio::test]
async fn test_primary_handle_is_tagged_primary() {
    let f = fixture();

    let handle = f.gateway.issue(&phone()).await.unwrap();

    assert_eq!(handle.issued_by(), Channel::Primary);
    assert_eq!(handle.token(), "session-1");
}

#[tokio::test]
async fn test_secondary_handle_defaults_to_phone() {
    let f = fixture();
    f.provider
        .fail_issue(ChannelError::RateLimited("TOO_MANY_ATTEMPTS_TRY_LATER".to_string()));

    let handle = f.gateway.issue(&phone()).await.unwrap();

    assert_eq!(handle.issued_by(), Channel::Secondary);
    assert_eq!(handle.token(), "+20100000000");
}

#[tokio::test]
async fn test_failure_reports_final_channel() {
    let f = fixture();
    f.provider
        .fail_issue(ChannelError::TransientUnavailable("503".to_string()));
    f.accounts
        .fail_issue(ChannelError::ConfigurationError("bad credentials".to_string()));

    let (channel, err) = f.gateway.issue(&phone()).await.unwrap_err();

    assert_eq!(channel, Channel::Secondary);
    assert!(matches!(err, ChannelError::ConfigurationError(_)));
}

#[tokio::test]
async fn test_token_invalidated_when_provider_fails() {
    let f = fixture();
    f.provider
        .fail_issue(ChannelError::ConfigurationError("MISSING_RECAPTCHA_TOKEN".to_string()));

    let _ = f.gateway.issue(&phone()).await;

    assert_eq!(f.anti_automation.acquire_calls(), 1);
    assert_eq!(
        *f.anti_automation.invalidated.lock().unwrap(),
        vec!["token-1".to_string()]
    );
}

#[tokio::test]
async fn test_confirm_routes_to_recorded_channel() {
    let f = fixture();
    let handle = ChannelHandle::new(Channel::Secondary, "+20100000000");

    f.gateway
        .confirm(Channel::Secondary, &phone(), &handle, "123456")
        .await
        .unwrap();

    assert_eq!(f.accounts.confirm_calls(), 1);
    assert_eq!(f.provider.confirm_calls(), 0);
}

#[tokio::test]
async fn test_confirm_rejects_cross_channel_handle() {
    let f = fixture();
    let handle = ChannelHandle::new(Channel::Primary, "session-1");

    let err = f
        .gateway
        .confirm(Channel::Secondary, &phone(), &handle, "123456")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ChannelError::ChannelMismatch {
            issued_by: Channel::Primary,
            confirming: Channel::Secondary
        }
    );
    assert_eq!(f.accounts.confirm_calls(), 0);
    assert_eq!(f.provider.confirm_calls(), 0);
}

#[tokio::test]
async fn test_channels_refuse_foreign_handles() {
    let provider = Arc::new(MockSmsProvider::new());
    let primary = PrimaryChannel::new(provider.clone(), Arc::new(MockAntiAutomation::new()));
    let secondary = SecondaryChannel::new(Arc::new(MockAccountService::new()));

    let primary_err = primary
        .confirm(&phone(), &ChannelHandle::new(Channel::Secondary, "x"), "123456")
        .await
        .unwrap_err();
    let secondary_err = secondary
        .confirm(&phone(), &ChannelHandle::new(Channel::Primary, "x"), "123456")
        .await
        .unwrap_err();

    assert!(matches!(primary_err, ChannelError::ChannelMismatch { .. }));
    assert!(matches!(secondary_err, ChannelError::ChannelMismatch { .. }));
    assert_eq!(provider.confirm_calls(), 0);
}
