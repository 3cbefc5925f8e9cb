//! Submission payload and the collaborator that receives it

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{field::FieldValue, scoring::ScoreOutcome};

/// Everything handed to the submission collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Slug of the quiz the answers belong to
    pub quiz: String,
    /// Contact values by namespaced field id; empty optional fields omitted
    pub contact: BTreeMap<String, FieldValue>,
    /// Answer values by namespaced question id
    pub answers: BTreeMap<String, String>,
    pub result: ScoreOutcome,
    pub submitted_at: DateTime<Utc>,
}

/// What the collaborator made of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// Field id → message, as reported by the receiver
    Rejected(BTreeMap<String, String>),
    /// Transport or server failure without field detail
    Fatal(String),
}

/// Receives finished forms (an HTTP endpoint, an outbox directory, ...)
pub trait Submitter: Send + Sync {
    fn submit(&self, submission: &Submission) -> SubmitOutcome;
}
