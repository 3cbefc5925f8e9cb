//! Configuration merging logic
//!
//! Later configs override earlier ones (defaults → global → project → env → CLI).
//! A layer only overrides a value it changed from the built-in default, so a
//! project file that sets one key leaves the global file's other keys alone.

use super::types::{Config, FormConfig, ScoringSettings, StorageConfig, ValidationConfig};

impl Config {
    /// Merge another config into this one (other takes precedence)
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            form: self.form.merge(other.form),
            scoring: self.scoring.merge(other.scoring),
            validation: self.validation.merge(other.validation),
            storage: self.storage.merge(other.storage),
        }
    }
}

fn prefer<T: PartialEq>(base: T, other: T, default: T) -> T {
    if other == default {
        base
    } else {
        other
    }
}

impl FormConfig {
    fn merge(self, other: Self) -> Self {
        let default = Self::default();
        Self {
            id_prefix: prefer(self.id_prefix, other.id_prefix, default.id_prefix),
            storage_key: prefer(self.storage_key, other.storage_key, default.storage_key),
            snapshot_ttl_secs: prefer(
                self.snapshot_ttl_secs,
                other.snapshot_ttl_secs,
                default.snapshot_ttl_secs,
            ),
            answer_debounce_ms: prefer(
                self.answer_debounce_ms,
                other.answer_debounce_ms,
                default.answer_debounce_ms,
            ),
        }
    }
}

impl ScoringSettings {
    fn merge(self, other: Self) -> Self {
        Self {
            max_answer_value: other.max_answer_value.or(self.max_answer_value),
        }
    }
}

impl ValidationConfig {
    fn merge(self, other: Self) -> Self {
        let default = Self::default();
        Self {
            required_message: prefer(
                self.required_message,
                other.required_message,
                default.required_message,
            ),
            answer_required_message: prefer(
                self.answer_required_message,
                other.answer_required_message,
                default.answer_required_message,
            ),
            contact_text_ascii_only: prefer(
                self.contact_text_ascii_only,
                other.contact_text_ascii_only,
                default.contact_text_ascii_only,
            ),
        }
    }
}

impl StorageConfig {
    fn merge(self, other: Self) -> Self {
        let default = Self::default();
        Self {
            snapshot_dir: prefer(self.snapshot_dir, other.snapshot_dir, default.snapshot_dir),
            outbox_dir: prefer(self.outbox_dir, other.outbox_dir, default.outbox_dir),
        }
    }
}
