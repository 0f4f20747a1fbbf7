//! Value objects of the verification domain.

pub mod phone_number;

pub use phone_number::PhoneNumber;
