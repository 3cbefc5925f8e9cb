//! Field validation and casting
//!
//! Pure, stateless checks of a single raw value against a [`Field`]:
//! required → cast → bounds → data-type format. The first failing step wins.
//! Failures are values ([`Invalid`]), never errors; the session turns them
//! into user-facing messages.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::field::{DataType, Field, FieldValue, RawValue};

/// Why a value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Invalid {
    #[error("a value is required")]
    Required,
    #[error("value cannot be read as the expected type")]
    Type,
    #[error("value is outside the allowed bounds")]
    OutOfBounds,
    #[error("value has an invalid format")]
    Format,
}

/// Validate `raw` against `field` and return the cast value.
///
/// `Ok(None)` means a missing value on an optional field. Empty text is a
/// value: it is required-checked, then cast and bounded like any other.
pub fn validate(field: &Field, raw: Option<&RawValue>) -> Result<Option<FieldValue>, Invalid> {
    let Some(raw) = raw else {
        return if field.required {
            Err(Invalid::Required)
        } else {
            Ok(None)
        };
    };

    if field.required && raw.is_blank() {
        return Err(Invalid::Required);
    }

    let value = cast_value(field.data_type, raw).ok_or(Invalid::Type)?;

    if !within_bounds(field, &value) {
        return Err(Invalid::OutOfBounds);
    }

    if !matches_data_type(field, &value) {
        return Err(Invalid::Format);
    }

    Ok(Some(value))
}

// ═══════════════════════════════════════════════════════════════════════════
// CASTING
// ═══════════════════════════════════════════════════════════════════════════

/// Coerce a raw value into `data_type`, or `None` when it cannot be read as one.
pub fn cast_value(data_type: DataType, raw: &RawValue) -> Option<FieldValue> {
    match data_type {
        DataType::String | DataType::Email | DataType::Phone | DataType::Name => match raw {
            RawValue::Text(text) => Some(FieldValue::Text(text.clone())),
            _ => None,
        },
        DataType::Int => match raw {
            RawValue::Int(value) => Some(FieldValue::Int(*value)),
            RawValue::Text(text) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
                text.parse().ok().map(FieldValue::Int)
            }
            _ => None,
        },
        DataType::Float => match raw {
            RawValue::Float(value) => Some(FieldValue::Float(*value)),
            RawValue::Int(value) => Some(FieldValue::Float(*value as f64)),
            RawValue::Text(text) => parse_numeric(text).map(FieldValue::Float),
            RawValue::Bool(_) => None,
        },
        DataType::Number => match raw {
            RawValue::Int(value) => Some(FieldValue::Int(*value)),
            RawValue::Float(value) => Some(FieldValue::Float(*value)),
            RawValue::Text(text) => cast_number_text(text),
            RawValue::Bool(_) => None,
        },
        DataType::Bool => match raw {
            RawValue::Bool(value) => Some(FieldValue::Bool(*value)),
            RawValue::Text(text) => match text.to_lowercase().as_str() {
                "true" | "1" => Some(FieldValue::Bool(true)),
                "false" | "0" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            RawValue::Int(value) => Some(FieldValue::Bool(*value == 1)),
            RawValue::Float(_) => None,
        },
    }
}

/// A finite decimal or scientific literal, surrounding whitespace allowed
fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let looks_numeric = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !looks_numeric {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn cast_number_text(text: &str) -> Option<FieldValue> {
    let parsed = parse_numeric(text)?;
    if text.contains('.') {
        return Some(FieldValue::Float(parsed));
    }
    text.trim()
        .parse::<i64>()
        .map(FieldValue::Int)
        .ok()
        .or(Some(FieldValue::Float(parsed)))
}

// ═══════════════════════════════════════════════════════════════════════════
// CONSTRAINTS
// ═══════════════════════════════════════════════════════════════════════════

/// Strings are measured in characters; numbers by value. Bools pass.
fn within_bounds(field: &Field, value: &FieldValue) -> bool {
    let measured = match value {
        FieldValue::Text(text) => text.chars().count() as f64,
        FieldValue::Int(number) => *number as f64,
        FieldValue::Float(number) => *number,
        FieldValue::Bool(_) => return true,
    };

    let above_min = field.min_length.map_or(true, |min| measured >= min as f64);
    let below_max = field.max_length.map_or(true, |max| measured <= max as f64);
    above_min && below_max
}

fn matches_data_type(field: &Field, value: &FieldValue) -> bool {
    let text = value.to_string();

    if field.text_policy.ascii_only && !text.is_ascii() {
        return false;
    }
    if field.text_policy.reject_cyrillic_han && has_cyrillic_or_han(&text) {
        return false;
    }

    if !field.options.is_empty() && !field.options.iter().any(|option| *option == text) {
        return false;
    }

    match field.data_type {
        DataType::Email => is_valid_email(&text),
        DataType::Phone => is_valid_phone(&text),
        DataType::Name => is_valid_name(&text),
        _ => true,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FORMAT CHECKS
// ═══════════════════════════════════════════════════════════════════════════

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// True if the text contains any Cyrillic or Han character
pub fn has_cyrillic_or_han(text: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"[\p{Script=Cyrillic}\p{Script=Han}]").is_some_and(|re| re.is_match(text))
}

/// `local@domain.tld` with no whitespace, and no Cyrillic or Han characters
pub fn is_valid_email(email: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^[^\s@]+@[^\s@]+\.[^\s@]+$").is_some_and(|re| re.is_match(email))
        && !has_cyrillic_or_han(email)
}

/// Digits, spaces, dashes and parentheses with an optional leading plus
pub fn is_valid_phone(phone: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^\+?[0-9\s()\-]+$").is_some_and(|re| re.is_match(phone))
        && !has_cyrillic_or_han(phone)
}

/// Letters, spaces, commas and periods only
pub fn is_valid_name(name: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^[a-zA-Z\s.,]+$").is_some_and(|re| re.is_match(name))
}

/// Free-text token check: letters, digits, underscores and commas, no
/// Cyrillic or Han characters.
pub fn is_text_valid(text: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^[A-Za-z0-9_,]+$").is_some_and(|re| re.is_match(text))
        && !has_cyrillic_or_han(text)
}
