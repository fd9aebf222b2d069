//! Field value types and validation

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A polymorphic field value that can hold different types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(u64),
    Decimal(Decimal),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a decimal if possible
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Compare against a raw query-string value.
    ///
    /// Strings compare case-insensitively, decimals numerically (so "250.5"
    /// matches a stored 250.50), timestamps by RFC 3339 text.
    pub fn matches_str(&self, raw: &str) -> bool {
        match self {
            FieldValue::String(s) => s.eq_ignore_ascii_case(raw),
            FieldValue::Integer(i) => raw.trim().parse::<u64>().is_ok_and(|v| v == *i),
            FieldValue::Decimal(d) => raw.trim().parse::<Decimal>().is_ok_and(|v| v == *d),
            FieldValue::DateTime(dt) => dt.to_rfc3339() == raw,
            FieldValue::Null => false,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

/// Field format validators applied to free-text input
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Email,
    Phone,
}

impl FieldFormat {
    /// Validate a raw string against this format
    pub fn validate(&self, value: &str) -> bool {
        match self {
            FieldFormat::Email => Self::is_valid_email(value),
            FieldFormat::Phone => Self::is_valid_phone(value),
        }
    }

    fn is_valid_email(email: &str) -> bool {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
        });
        regex.is_match(email)
    }

    fn is_valid_phone(phone: &str) -> bool {
        static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
        // Local numbers may keep their leading 0; separators are dropped first
        let regex = PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?\d{7,15}$").unwrap());
        let compact: String = phone
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();
        regex.is_match(&compact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_field_value_string() {
        let value = FieldValue::String("test".to_string());
        assert_eq!(value.as_string(), Some("test"));
        assert_eq!(value.as_integer(), None);
        assert!(!value.is_null());
    }

    #[test]
    fn test_field_value_integer() {
        let value = FieldValue::Integer(42);
        assert_eq!(value.as_integer(), Some(42));
        assert_eq!(value.as_string(), None);
    }

    #[test]
    fn test_field_value_null() {
        let value = FieldValue::Null;
        assert!(value.is_null());
        assert!(!value.matches_str(""));
    }

    #[test]
    fn test_matches_str_decimal_is_numeric() {
        let value = FieldValue::Decimal(Decimal::from_str("250.50").unwrap());
        assert!(value.matches_str("250.5"));
        assert!(value.matches_str(" 250.50 "));
        assert!(!value.matches_str("250.51"));
        assert!(!value.matches_str("abc"));
    }

    #[test]
    fn test_matches_str_string_ignores_case() {
        let value = FieldValue::from("Completed".to_string());
        assert!(value.matches_str("completed"));
        assert!(!value.matches_str("Received"));
    }

    #[test]
    fn test_email_validation() {
        let format = FieldFormat::Email;

        assert!(format.validate("test@example.com"));
        assert!(format.validate("user.name+tag@example.co.in"));
        assert!(!format.validate("invalid-email"));
        assert!(!format.validate("@example.com"));
    }

    #[test]
    fn test_phone_validation() {
        let format = FieldFormat::Phone;

        assert!(format.validate("+919876543210"));
        assert!(format.validate("98765 43210"));
        assert!(format.validate("022-2345-6789"));
        assert!(!format.validate("123"));
        assert!(!format.validate("call me"));
    }
}
