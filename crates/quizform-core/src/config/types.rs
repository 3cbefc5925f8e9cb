//! Configuration type definitions
//!
//! Pure data holders; behavior lives in the sibling modules.

use serde::{Deserialize, Serialize};

/// Root configuration structure
///
/// Loaded from defaults → global → project → env vars → CLI flags
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub form: FormConfig,
    pub scoring: ScoringSettings,
    pub validation: ValidationConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormConfig {
    /// Namespace prefix applied to every field id
    pub id_prefix: String,
    /// Key the session snapshot is stored under
    pub storage_key: String,
    pub snapshot_ttl_secs: u32,
    pub answer_debounce_ms: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringSettings {
    /// Highest score a single answer can contribute; scoring fails while unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_answer_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationConfig {
    pub required_message: String,
    pub answer_required_message: String,
    /// Reject non-ASCII input in email, phone and name contact fields
    pub contact_text_ascii_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub snapshot_dir: String,
    pub outbox_dir: String,
}
