//! Unit tests for the console SMS provider

use pv_core::errors::ChannelError;
use pv_core::services::verification::{AntiAutomationToken, PhoneNormalizer, SmsProvider};

use crate::sms::console_sms::generate_code;
use crate::sms::ConsoleSmsProvider;

#[test]
fn test_generated_codes_are_numeric() {
    let code = generate_code(6);
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_confirm_rejects_near_misses() {
    let provider = ConsoleSmsProvider::new(6);
    let phone = PhoneNormalizer::default().normalize("0100000000").unwrap();
    let session = provider
        .issue(&phone, &AntiAutomationToken::new("token"))
        .await
        .unwrap();
    let code = provider.code_for(&session).unwrap();

    let truncated = &code[..5];
    let extended = format!("{}0", code);
    let last = if code.ends_with('9') { '0' } else { '9' };
    let altered = format!("{}{}", &code[..5], last);

    for submitted in [truncated, extended.as_str(), altered.as_str()] {
        assert_eq!(
            provider.confirm(&session, submitted).await,
            Err(ChannelError::InvalidCode),
            "{}",
            submitted
        );
    }
    provider.confirm(&session, &code).await.unwrap();
}

#[tokio::test]
async fn test_issue_then_confirm() {
    let provider = ConsoleSmsProvider::new(6);
    let phone = PhoneNormalizer::default().normalize("0100000000").unwrap();

    let session = provider
        .issue(&phone, &AntiAutomationToken::new("token"))
        .await
        .unwrap();
    let code = provider.code_for(&session).unwrap();

    assert_eq!(provider.confirm(&session, "000000x").await, Err(ChannelError::InvalidCode));
    provider.confirm(&session, &code).await.unwrap();
    assert_eq!(provider.confirm(&session, &code).await, Err(ChannelError::Expired));
}
