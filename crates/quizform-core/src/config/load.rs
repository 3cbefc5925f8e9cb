//! Configuration loading from files and environment
//!
//! All operations return new instances rather than mutating in place.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use tracing::debug;

use super::types::Config;
use crate::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy
///
/// # Errors
///
/// Returns error if:
/// - Config file is malformed TOML
/// - An environment override cannot be parsed
/// - Config values fail validation
pub fn load_config() -> Result<Config> {
    let global = global_config_path();
    let project = project_config_path()?;
    load_config_from(global.as_deref(), &project)
}

/// Load configuration from explicit global and project file locations.
///
/// Missing files are skipped.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from(global: Option<&Path>, project: &Path) -> Result<Config> {
    // 1. Built-in defaults
    let config = Config::default();

    // 2. Global config
    let config = match global.filter(|path| path.exists()) {
        Some(path) => config.merge(load_toml_file(path)?),
        None => config,
    };

    // 3. Project config
    let config = if project.exists() {
        config.merge(load_toml_file(project)?)
    } else {
        config
    };

    // 4. Environment variable overrides
    let config = config.apply_env_vars()?;

    config.validate()?;
    debug!(?config, "Configuration loaded");
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "quizform")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Get path to project config file
///
/// # Errors
///
/// Returns error if current directory cannot be determined
pub fn project_config_path() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|dir| dir.join(".quizform/config.toml"))
        .map_err(|e| Error::Io(format!("Failed to get current directory: {e}")))
}

/// Load a TOML file into a partial Config
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Path is a directory instead of a file
/// - TOML is malformed
pub fn load_toml_file(path: &Path) -> Result<Config> {
    if path.is_dir() {
        return Err(Error::Io(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("Failed to read config file {}: {e}", path.display())))?;

    toml::from_str(&content).map_err(|e| {
        Error::Parse(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply `QUIZFORM_*` environment variable overrides
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(self) -> Result<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if a value cannot be parsed
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("QUIZFORM_ID_PREFIX") {
            self.form.id_prefix = value;
        }
        if let Some(value) = lookup("QUIZFORM_STORAGE_KEY") {
            self.form.storage_key = value;
        }
        if let Some(value) = lookup("QUIZFORM_SNAPSHOT_TTL_SECS") {
            self.form.snapshot_ttl_secs = parse_env("QUIZFORM_SNAPSHOT_TTL_SECS", &value)?;
        }
        if let Some(value) = lookup("QUIZFORM_ANSWER_DEBOUNCE_MS") {
            self.form.answer_debounce_ms = parse_env("QUIZFORM_ANSWER_DEBOUNCE_MS", &value)?;
        }
        if let Some(value) = lookup("QUIZFORM_MAX_ANSWER_VALUE") {
            self.scoring.max_answer_value = Some(parse_env("QUIZFORM_MAX_ANSWER_VALUE", &value)?);
        }
        if let Some(value) = lookup("QUIZFORM_CONTACT_TEXT_ASCII_ONLY") {
            self.validation.contact_text_ascii_only =
                parse_env("QUIZFORM_CONTACT_TEXT_ASCII_ONLY", &value)?;
        }
        if let Some(value) = lookup("QUIZFORM_SNAPSHOT_DIR") {
            self.storage.snapshot_dir = value;
        }
        if let Some(value) = lookup("QUIZFORM_OUTBOX_DIR") {
            self.storage.outbox_dir = value;
        }
        Ok(self)
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::InvalidConfig(format!("Invalid {key} value '{value}': {e}")))
}
