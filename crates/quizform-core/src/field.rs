//! Form fields and their values
//!
//! A [`Field`] is the immutable validation contract for one input, built by
//! the schema. Mutable per-field state lives apart from it in [`FieldState`]
//! so a schema can be shared by many sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Declared data type a raw input is cast into
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataType {
    String,
    Int,
    Float,
    Number,
    Bool,
    Email,
    Phone,
    Name,
}

impl DataType {
    /// Types whose cast value is always text
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::String | Self::Email | Self::Phone | Self::Name)
    }
}

/// Which anti-spam text heuristics apply to a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPolicy {
    /// Reject any character outside 7-bit ASCII
    pub ascii_only: bool,
    /// Reject Cyrillic and Han script characters
    pub reject_cyrillic_han: bool,
}

impl TextPolicy {
    pub const STRICT: Self = Self {
        ascii_only: true,
        reject_cyrillic_han: true,
    };
    pub const ASCII: Self = Self {
        ascii_only: true,
        reject_cyrillic_han: false,
    };
    pub const SCRIPT_FILTER: Self = Self {
        ascii_only: false,
        reject_cyrillic_han: true,
    };
}

/// One input unit of the form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Namespaced, unique across the whole form
    pub id: String,
    pub section_id: String,
    /// 1-based position within its section
    pub order: usize,
    pub html_type: String,
    pub label: String,
    pub placeholder: String,
    pub data_type: DataType,
    /// Minimum string length or numeric value
    pub min_length: Option<i64>,
    /// Maximum string length or numeric value
    pub max_length: Option<i64>,
    /// Shown when validation fails
    pub message: String,
    pub required: bool,
    pub is_question: bool,
    pub text_policy: TextPolicy,
    /// Choices for select/radio contact inputs
    pub options: Vec<String>,
}

/// A value as entered, before casting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// Empty text counts as "no value"
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// Loose equality against a text value, the way a browser form compares
    /// a radio input's value with the stored one.
    pub fn matches_text(&self, other: &str) -> bool {
        match self {
            Self::Text(text) => text == other,
            Self::Int(value) => value.to_string() == other,
            Self::Float(value) => other.parse::<f64>().is_ok_and(|parsed| parsed == *value),
            Self::Bool(value) => matches!(
                (*value, other),
                (true, "1" | "true") | (false, "0" | "false" | "")
            ),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(true) => write!(f, "1"),
            Self::Bool(false) => Ok(()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// A value after a successful cast into the field's data type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(true) => write!(f, "1"),
            Self::Bool(false) => Ok(()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SET-ONCE STATE
// ═══════════════════════════════════════════════════════════════════════════

/// A slot that is filled at most once until cleared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOnce<T>(Option<T>);

impl<T> Default for SetOnce<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> SetOnce<T> {
    pub const fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub const fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Store `value` unless already set; returns whatever is stored.
    pub fn set_if_unset(&mut self, value: T) -> &T {
        self.0.get_or_insert(value)
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// Mutable per-field state recorded while a submission is assembled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    value: SetOnce<FieldValue>,
    score: SetOnce<f64>,
}

impl FieldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a validated value. A second call keeps the first value.
    pub fn set_value(&mut self, value: FieldValue) -> &FieldValue {
        self.value.set_if_unset(value)
    }

    /// Forget the stored value so a new one can be set
    pub fn clear_value(&mut self) {
        self.value.clear();
    }

    /// Record the field's score.
    ///
    /// # Panics
    ///
    /// Panics if a score was already recorded: scoring a field twice is a
    /// logic error in the caller, not a user error.
    pub fn set_score(&mut self, score: f64) -> f64 {
        assert!(
            !self.score.is_set(),
            "score for this field has already been set and cannot be changed"
        );
        *self.score.set_if_unset(score)
    }

    pub const fn value(&self) -> Option<&FieldValue> {
        self.value.get()
    }

    pub fn score(&self) -> Option<f64> {
        self.score.get().copied()
    }
}
