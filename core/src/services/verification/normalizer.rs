//! Phone number normalization into canonical international form

use once_cell::sync::Lazy;
use regex::Regex;

use pv_shared::config::PhoneRulesConfig;
use pv_shared::utils::phone::digits_only;

use crate::domain::value_objects::PhoneNumber;
use crate::errors::PhoneFormatError;

/// Validates user-entered phone numbers against one national mobile format
///
/// Accepted inputs, after stripping every non-digit character:
/// - the national form (`national_length` digits, trunk prefix included,
///   starting with a whitelisted mobile prefix), e.g. `010 000 0000`
/// - the international form with or without `+` / `00`, e.g. `+20 10 000 0000`
///
/// Both produce `+<country code><national digits without trunk prefix>`.
#[derive(Debug, Clone)]
pub struct PhoneNormalizer {
    rules: PhoneRulesConfig,
    mobile_prefix: Regex,
}

// Matches nothing; stands in for an empty prefix whitelist
static NO_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\s\S]").unwrap());

/// `^(?:010|011|...)` built from the whitelisted prefixes
fn mobile_prefix_regex(prefixes: &[String]) -> Regex {
    let alternatives: Vec<String> = prefixes
        .iter()
        .filter(|prefix| !prefix.is_empty())
        .map(|prefix| regex::escape(prefix))
        .collect();
    if alternatives.is_empty() {
        return NO_PREFIX.clone();
    }

    Regex::new(&format!("^(?:{})", alternatives.join("|"))).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Mobile prefix whitelist rejected; no number will validate");
        NO_PREFIX.clone()
    })
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(PhoneRulesConfig::default())
    }
}

impl PhoneNormalizer {
    pub fn new(rules: PhoneRulesConfig) -> Self {
        let mobile_prefix = mobile_prefix_regex(&rules.mobile_prefixes);
        Self {
            rules,
            mobile_prefix,
        }
    }

    pub fn rules(&self) -> &PhoneRulesConfig {
        &self.rules
    }

    /// Canonicalize `raw`, or explain why it is not a supported mobile number
    pub fn normalize(&self, raw: &str) -> Result<PhoneNumber, PhoneFormatError> {
        let digits = digits_only(raw);
        if digits.is_empty() {
            return Err(PhoneFormatError::Empty);
        }

        let explicit_international = raw.trim_start().starts_with('+');
        let national = if !explicit_international && digits.len() == self.rules.national_length {
            digits
        } else {
            self.national_from_international(&digits)?
        };

        self.validate_national(&national)?;

        let subscriber = &national[self.rules.trunk_prefix.len()..];
        Ok(PhoneNumber::from_parts(&self.rules.country_code, subscriber))
    }

    /// Rebuild the national form from digits carrying the country code
    fn national_from_international(&self, digits: &str) -> Result<String, PhoneFormatError> {
        let international_prefix = format!("00{}", self.rules.country_code);
        let rest = digits
            .strip_prefix(international_prefix.as_str())
            .or_else(|| digits.strip_prefix(self.rules.country_code.as_str()))
            .ok_or_else(|| {
                if digits.len() < self.rules.national_length {
                    PhoneFormatError::WrongLength {
                        expected: self.rules.national_length,
                        actual: digits.len(),
                    }
                } else {
                    PhoneFormatError::UnsupportedCountryCode {
                        expected: self.rules.country_code.clone(),
                    }
                }
            })?;

        // Some users keep the trunk digit after the country code (+20 010 ...).
        if !self.rules.trunk_prefix.is_empty()
            && rest.starts_with(self.rules.trunk_prefix.as_str())
            && rest.len() == self.rules.national_length
        {
            return Ok(rest.to_string());
        }

        Ok(format!("{}{}", self.rules.trunk_prefix, rest))
    }

    fn validate_national(&self, national: &str) -> Result<(), PhoneFormatError> {
        if national.len() != self.rules.national_length {
            return Err(PhoneFormatError::WrongLength {
                expected: self.rules.national_length,
                actual: national.len(),
            });
        }

        if !self.mobile_prefix.is_match(national) {
            return Err(PhoneFormatError::UnsupportedPrefix);
        }

        Ok(())
    }
}
