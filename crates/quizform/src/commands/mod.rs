//! Command implementations
//!
//! Every command starts from a [`QuizContext`]: the layered configuration with
//! command-line overrides applied, plus the selected quiz definition.

pub mod check;
pub mod run;
pub mod schema;
pub mod score;

use std::path::{Path, PathBuf};

use anyhow::Result;
use quizform_core::{
    config::{global_config_path, load_config_from, project_config_path},
    Config, Error, FormSchema, JsonFileSource, QuizDefinition, QuizSource, ScoringConfig,
};

/// Values given on the command line that win over every config layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub id_prefix: Option<String>,
    pub max_answer_value: Option<f64>,
    pub snapshot_dir: Option<String>,
    pub outbox_dir: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(prefix) = self.id_prefix {
            config.form.id_prefix = prefix;
        }
        if let Some(max) = self.max_answer_value {
            config.scoring.max_answer_value = Some(max);
        }
        if let Some(dir) = self.snapshot_dir {
            config.storage.snapshot_dir = dir;
        }
        if let Some(dir) = self.outbox_dir {
            config.storage.outbox_dir = dir;
        }
        config
    }
}

/// Options shared by all commands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizOptions {
    pub quiz: PathBuf,
    pub slug: Option<String>,
    /// Replaces the project config file location
    pub config: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

/// Configuration and definition a command works on
#[derive(Debug, Clone)]
pub struct QuizContext {
    pub config: Config,
    pub definition: QuizDefinition,
}

impl QuizContext {
    /// Load configuration layers, then the quiz.
    ///
    /// # Errors
    ///
    /// Fails on unreadable or invalid configuration, a missing explicit config
    /// file, and a quiz that cannot be found or parsed.
    pub fn load(options: &QuizOptions) -> Result<Self> {
        let config = load_layered_config(
            global_config_path().as_deref(),
            options.config.as_deref(),
            options.overrides.clone(),
        )?;
        let definition = JsonFileSource::new(&options.quiz).load_quiz(options.slug.as_deref())?;
        Ok(Self { config, definition })
    }

    /// # Errors
    ///
    /// Returns `Error::Definition` when the quiz cannot be turned into a form.
    pub fn schema(&self) -> Result<FormSchema> {
        Ok(FormSchema::build(&self.definition, &self.config.schema_config())?)
    }

    /// Configured scoring.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when no maximum answer value is set or
    /// the configured one is not positive.
    pub fn scoring(&self) -> Result<ScoringConfig> {
        let scoring = self.config.scoring_config()?.ok_or_else(|| {
            Error::InvalidConfig(
                "scoring.max_answer_value is not configured; set it in [scoring], \
                 QUIZFORM_MAX_ANSWER_VALUE or --max-answer-value"
                    .to_string(),
            )
        })?;
        Ok(scoring)
    }
}

/// Defaults → `global` → project (or `explicit`) → environment → overrides
///
/// # Errors
///
/// Returns `Error::NotFound` for a missing explicit file, otherwise any
/// loading or validation error.
pub fn load_layered_config(
    global: Option<&Path>,
    explicit: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<Config> {
    let project = match explicit {
        Some(path) if !path.exists() => {
            return Err(Error::NotFound(format!("config file {}", path.display())).into());
        }
        Some(path) => path.to_path_buf(),
        None => project_config_path()?,
    };

    let config = overrides.apply(load_config_from(global, &project)?);
    config.validate()?;
    Ok(config)
}
