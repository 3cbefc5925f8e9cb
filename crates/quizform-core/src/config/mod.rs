//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: ~/.config/quizform/config.toml
//! 3. Project config: .quizform/config.toml
//! 4. Environment variables: QUIZFORM_*
//! 5. CLI flags (command-specific)
//!
//! # Example Config
//!
//! ```toml
//! [form]
//! id_prefix = "qsf"
//! snapshot_ttl_secs = 600
//! answer_debounce_ms = 50
//!
//! [scoring]
//! max_answer_value = 4
//!
//! [validation]
//! required_message = "This field is required"
//! contact_text_ascii_only = true
//!
//! [storage]
//! snapshot_dir = ".quizform/snapshots"
//! outbox_dir = ".quizform/outbox"
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `load`: Loading from files and environment
//! - `merge`: Configuration merging logic
//! - `validate`: Range checks and conversion into core settings

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod tests_defaults;
#[cfg(test)]
mod tests_loading;
#[cfg(test)]
mod tests_validation;

pub use load::{
    global_config_path, load_config, load_config_from, load_toml_file, project_config_path,
};
pub use types::{Config, FormConfig, ScoringSettings, StorageConfig, ValidationConfig};
