//! Error types for quizform-core

use thiserror::Error;

/// Core error type for quiz form operations.
///
/// Per-field validation failures are not errors: they are recorded in the
/// session's error map. This type covers structural, storage and
/// collaborator failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Quiz definition cannot be turned into a form
    #[error("Definition error: {0}")]
    Definition(String),

    /// Resource not found (quiz slug, definition file)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The result bands do not cover the computed percentage
    #[error("No result band matches a score of {percentage}%")]
    NoMatchingBand {
        /// Rounded percentage that fell outside every band
        percentage: f64,
    },

    /// Scoring could not be computed
    #[error("Scoring error: {0}")]
    Scoring(String),

    /// Snapshot store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Submission collaborator failed without field errors
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Configuration value out of range or malformed
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Malformed JSON or TOML input
    #[error("Parse error: {0}")]
    Parse(String),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(String),

    /// Operation not valid in the current session state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Returns the process exit code for this error.
    ///
    /// - 1: invalid input or configuration
    /// - 2: IO, storage or submission transport
    /// - 3: not found
    /// - 4: invalid state (definition, scoring, operation)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) | Self::Parse(_) => 1,
            Self::Io(_) | Self::Storage(_) | Self::Submission(_) => 2,
            Self::NotFound(_) => 3,
            Self::Definition(_)
            | Self::NoMatchingBand { .. }
            | Self::Scoring(_)
            | Self::InvalidOperation(_) => 4,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(format!("Failed to parse config: {err}"))
    }
}

/// Result type alias for quizform-core operations
pub type Result<T> = std::result::Result<T, Error>;
