//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    AccountService, AntiAutomationChallenge, AntiAutomationToken, ChannelGateway, Clock,
    CodeChannel, PhoneNormalizer, PrimaryChannel, RequestCodeResult, SecondaryChannel,
    SmsProvider, SubmitCodeResult, SystemClock, VerificationOrchestrator,
    VerificationServiceConfig, VerificationSnapshot, VerificationState,
};
