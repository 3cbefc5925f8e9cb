//! Configuration validation and conversion into core settings

use std::time::Duration;

use super::types::Config;
use crate::{
    schema::SchemaConfig,
    scoring::ScoringConfig,
    session::SessionSettings,
    Error, Result,
};

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if any value is out of range or invalid
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.form.id_prefix;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidConfig(format!(
                "form.id_prefix must be non-empty ASCII letters and digits, got '{prefix}'"
            )));
        }

        if self.form.storage_key.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "form.storage_key cannot be empty".to_string(),
            ));
        }

        if !(60..=86_400).contains(&self.form.snapshot_ttl_secs) {
            return Err(Error::InvalidConfig(
                "form.snapshot_ttl_secs must be 60-86400".to_string(),
            ));
        }

        if self.form.answer_debounce_ms > 2000 {
            return Err(Error::InvalidConfig(
                "form.answer_debounce_ms must be 0-2000".to_string(),
            ));
        }

        if self.validation.required_message.trim().is_empty()
            || self.validation.answer_required_message.trim().is_empty()
        {
            return Err(Error::InvalidConfig(
                "validation messages cannot be empty".to_string(),
            ));
        }

        self.scoring_config().map(|_| ())
    }

    /// The configured scoring parameters, if a maximum answer value is set
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for a non-positive maximum
    pub fn scoring_config(&self) -> Result<Option<ScoringConfig>> {
        self.scoring
            .max_answer_value
            .map(ScoringConfig::new)
            .transpose()
    }

    pub fn schema_config(&self) -> SchemaConfig {
        SchemaConfig {
            id_prefix: self.form.id_prefix.clone(),
            contact_text_ascii_only: self.validation.contact_text_ascii_only,
        }
    }

    pub fn session_settings(&self, scoring: ScoringConfig) -> SessionSettings {
        SessionSettings {
            snapshot_ttl: chrono::Duration::seconds(i64::from(self.form.snapshot_ttl_secs)),
            required_message: self.validation.required_message.clone(),
            answer_required_message: self.validation.answer_required_message.clone(),
            scoring,
        }
    }

    pub fn answer_debounce(&self) -> Duration {
        Duration::from_millis(u64::from(self.form.answer_debounce_ms))
    }
}
