//! Account backend adapters
//!
//! The account backend owns the user record and runs the secondary code
//! rail used when the primary SMS provider is out of capacity.

pub mod http_account_service;
pub mod memory_account_service;

pub use http_account_service::{classify_account_response, HttpAccountService};
pub use memory_account_service::InMemoryAccountService;

#[cfg(test)]
mod tests;
