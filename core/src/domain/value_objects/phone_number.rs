//! Canonical phone number value object.

use serde::{Serialize, Serializer};
use std::fmt;

use pv_shared::utils::phone::mask_phone_number;

/// A phone number in canonical international form (`+<country code><digits>`)
///
/// Instances are only produced by
/// [`PhoneNormalizer`](crate::services::verification::PhoneNormalizer), so every
/// value has passed the configured national format rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber {
    canonical: String,
    country_code_len: usize,
}

impl PhoneNumber {
    pub(crate) fn from_parts(country_code: &str, subscriber: &str) -> Self {
        Self {
            canonical: format!("+{}{}", country_code, subscriber),
            country_code_len: country_code.len(),
        }
    }

    /// The canonical string, e.g. `+20100000000`
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Country calling code without `+`
    pub fn country_code(&self) -> &str {
        &self.canonical[1..=self.country_code_len]
    }

    /// Digits following the country code
    pub fn subscriber_number(&self) -> &str {
        &self.canonical[self.country_code_len + 1..]
    }

    /// Masked form safe for logs
    pub fn masked(&self) -> String {
        mask_phone_number(&self.canonical)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}
