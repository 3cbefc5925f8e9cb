//! Quizform-core - Multi-step quiz form engine
//!
//! This crate provides:
//! - Quiz definition model, sanitization and authoring checks
//! - Field validation and casting
//! - Schema building (namespaced fields, ordered sections)
//! - The form session state machine with snapshot persistence
//! - Scoring and result-band resolution
//! - Layered configuration

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod controller;
pub mod definition;
pub mod error;
pub mod field;
pub mod schema;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod source;
pub mod submit;
pub mod validator;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use controller::FormController;
pub use definition::{AuthoringIssue, QuizDefinition};
pub use error::{Error, Result};
pub use field::{DataType, Field, FieldValue, RawValue};
pub use schema::{FormSchema, SchemaConfig};
pub use scoring::{ScoreOutcome, ScoringConfig};
pub use session::{ChoiceOutcome, ErrorMap, FormSession, SessionSettings, Stage, SubmitReport};
pub use snapshot::{FileStore, MemoryStore, SnapshotStore};
pub use source::{JsonFileSource, QuizSource};
pub use submit::{SubmitOutcome, Submission, Submitter};
