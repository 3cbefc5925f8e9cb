//! Form session state machine
//!
//! Owns the progress through a form: the current stage, the global question
//! cursor, entered values, the error map and the edit overlay. Every mutating
//! operation ends by persisting a [`Snapshot`]; `restore` is the only reader.
//!
//! ```text
//! contact ──next_section──▶ questions ──last answer──▶ answers
//!                               ▲                        │
//!                               └──────edit_answer───────┘
//! ```

use std::{collections::BTreeMap, sync::Arc};

use chrono::Duration;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    error::{Error, Result},
    field::{Field, FieldState, FieldValue, RawValue},
    schema::FormSchema,
    scoring::{self, parse_answer_value, ScoringConfig},
    snapshot::{Snapshot, SnapshotStore},
    submit::{SubmitOutcome, Submission, Submitter},
    validator::{self, Invalid},
};

/// Default snapshot lifetime
pub const DEFAULT_SNAPSHOT_TTL_SECS: i64 = 600;
pub const DEFAULT_REQUIRED_MESSAGE: &str = "This field is required";
pub const DEFAULT_ANSWER_REQUIRED_MESSAGE: &str = "Please select an answer";

/// Which part of the form is active
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    #[default]
    Contact,
    Questions,
    Answers,
}

impl Stage {
    /// The following stage; `Answers` is terminal
    pub const fn next(self) -> Self {
        match self {
            Self::Contact => Self::Questions,
            Self::Questions | Self::Answers => Self::Answers,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ERROR MAP
// ═══════════════════════════════════════════════════════════════════════════

/// Value key → user-facing message, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap {
    entries: IndexMap<String, String>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced entry keeps its position
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.entries.insert(key.into(), message.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The key inserted first
    pub fn first_key(&self) -> Option<&str> {
        self.entries.keys().next().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, message)| (key.as_str(), message.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SETTINGS AND REPORTS
// ═══════════════════════════════════════════════════════════════════════════

/// Session behavior taken from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub snapshot_ttl: Duration,
    /// Shown for a missing contact value
    pub required_message: String,
    /// Shown for an unanswered question
    pub answer_required_message: String,
    pub scoring: ScoringConfig,
}

impl SessionSettings {
    /// Default messages and lifetime around an explicit scoring config
    pub fn new(scoring: ScoringConfig) -> Self {
        Self {
            snapshot_ttl: Duration::seconds(DEFAULT_SNAPSHOT_TTL_SECS),
            required_message: DEFAULT_REQUIRED_MESSAGE.to_string(),
            answer_required_message: DEFAULT_ANSWER_REQUIRED_MESSAGE.to_string(),
            scoring,
        }
    }
}

/// How `restore` went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing stored
    Absent,
    /// Stored snapshot was past its expiry and has been cleared
    Expired,
    /// Stored snapshot did not decode and has been cleared
    Corrupt,
    Restored {
        /// False when the stored global index was out of range
        global_index: bool,
    },
}

/// Result of `validate_section`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionReport {
    pub errors: ErrorMap,
    /// Stage after validation
    pub stage: Stage,
}

impl SectionReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of `validate_all`
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitReport {
    /// Every question is answered and the caller asked to show them
    ShowAnswers,
    /// The submitter took the form
    Accepted(Submission),
    /// The submitter returned field errors, now in the error map
    Rejected(ErrorMap),
    /// Local validation failed
    Invalid(ErrorMap),
    /// The session was already submitted
    AlreadySubmitted,
}

/// A choice taken under the re-entrancy guard, waiting to be settled
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a pending choice holds the guard until settled"]
pub struct PendingChoice {
    question_id: String,
    value: RawValue,
}

impl PendingChoice {
    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    pub const fn value(&self) -> &RawValue {
        &self.value
    }
}

/// What `choose_answer` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceOutcome {
    /// Another choice was still pending
    Suppressed,
    /// The question id is not part of the form
    UnknownQuestion,
    /// Re-picking the stored answer while editing finished the edit
    EditKept,
    /// The value was stored; `stage` is where the session moved
    Recorded { stage: Stage },
}

// ═══════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════

/// One user's progress through a form
pub struct FormSession {
    schema: Arc<FormSchema>,
    settings: SessionSettings,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    values: BTreeMap<String, RawValue>,
    errors: ErrorMap,
    stage: Stage,
    current_question_index: usize,
    global_question_index: usize,
    editing_question_id: Option<String>,
    choice_pending: bool,
    submitted: bool,
}

impl FormSession {
    /// Start a session, resuming from the store when a live snapshot exists.
    pub fn init(
        schema: Arc<FormSchema>,
        settings: SessionSettings,
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut session = Self {
            schema,
            settings,
            store,
            clock,
            values: BTreeMap::new(),
            errors: ErrorMap::new(),
            stage: Stage::Contact,
            current_question_index: 0,
            global_question_index: 0,
            editing_question_id: None,
            choice_pending: false,
            submitted: false,
        };
        let outcome = session.restore();
        debug!(?outcome, stage = %session.stage, "Form session initialized");
        session
    }

    /// Re-read the store. Expired and corrupt snapshots are cleared.
    pub fn restore(&mut self) -> RestoreOutcome {
        let outcome = self.read_snapshot();

        let restored = matches!(outcome, RestoreOutcome::Restored { .. });
        if !restored && self.stage == Stage::Questions {
            self.resume_at_first_unanswered();
        }
        outcome
    }

    fn read_snapshot(&mut self) -> RestoreOutcome {
        let raw = match self.store.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return RestoreOutcome::Absent,
            Err(e) => {
                warn!(error = %e, "Failed to read form snapshot");
                return RestoreOutcome::Absent;
            }
        };

        let snapshot = match Snapshot::decode(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(error = %e, "Discarding unreadable form snapshot");
                self.discard_snapshot();
                return RestoreOutcome::Corrupt;
            }
        };

        if snapshot.is_expired(self.clock.now()) {
            debug!(expires_at = %snapshot.expires_at, "Discarding expired form snapshot");
            self.discard_snapshot();
            return RestoreOutcome::Expired;
        }

        let global = snapshot.global_index_within(self.schema.total_questions());
        self.values = snapshot.values;
        self.stage = snapshot.current_section;
        self.current_question_index = snapshot.current_question_index;
        // An out-of-range index falls back to the start, not to a scan
        self.global_question_index = global.unwrap_or(0);
        RestoreOutcome::Restored {
            global_index: global.is_some(),
        }
    }

    fn discard_snapshot(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear form snapshot");
        }
    }

    fn resume_at_first_unanswered(&mut self) {
        let first_unanswered = self
            .schema
            .question_ids()
            .position(|id| !self.is_answered(id));
        if let Some(index) = first_unanswered {
            self.move_cursor(index);
        }
    }

    // ─── Getters ─────────────────────────────────────────────────────────

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub const fn stage(&self) -> Stage {
        self.stage
    }

    pub const fn values(&self) -> &BTreeMap<String, RawValue> {
        &self.values
    }

    pub fn value(&self, key: &str) -> Option<&RawValue> {
        self.values.get(key)
    }

    /// Stored answer for a question, by raw or namespaced id
    pub fn answer(&self, question_id: &str) -> Option<&RawValue> {
        let id = self.canonical_question_id(question_id)?;
        self.values.get(&FormSchema::answer_key(id))
    }

    pub const fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub const fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub const fn global_question_index(&self) -> usize {
        self.global_question_index
    }

    pub fn editing_question_id(&self) -> Option<&str> {
        self.editing_question_id.as_deref()
    }

    pub const fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub const fn is_choice_pending(&self) -> bool {
        self.choice_pending
    }

    /// The question under the global cursor
    pub fn current_question(&self) -> Option<&Field> {
        self.schema.question_at(self.global_question_index)
    }

    pub fn all_questions_answered(&self) -> bool {
        self.schema.question_ids().all(|id| self.is_answered(id))
    }

    /// Text of the answer option whose value equals `score`
    pub fn get_label(&self, score: &str) -> Option<&str> {
        let numeric = score.trim().parse::<f64>().ok();
        self.schema
            .answer_options()
            .iter()
            .find(|option| {
                option.value == score
                    || numeric.is_some_and(|n| parse_answer_value(&option.value).is_ok_and(|v| v == n))
            })
            .map(|option| option.text.as_str())
    }

    fn is_answered(&self, question_id: &str) -> bool {
        self.values
            .get(&FormSchema::answer_key(question_id))
            .is_some_and(|value| !value.is_blank())
    }

    fn canonical_question_id(&self, question_id: &str) -> Option<&str> {
        let index = self.schema.global_index_of(question_id)?;
        self.schema.question_at(index).map(|field| field.id.as_str())
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Record an entered value for a field (raw or namespaced id).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOperation` for an id outside the form.
    pub fn set_value(&mut self, field_id: &str, value: impl Into<RawValue>) -> Result<()> {
        let key = self.input_key(field_id)?;
        self.values.insert(key, value.into());
        self.persist();
        Ok(())
    }

    /// Forget the entered value for a field, leaving it missing.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOperation` for an id outside the form.
    pub fn clear_value(&mut self, field_id: &str) -> Result<()> {
        let key = self.input_key(field_id)?;
        if self.values.remove(&key).is_some() {
            self.persist();
        }
        Ok(())
    }

    fn input_key(&self, field_id: &str) -> Result<String> {
        self.schema
            .field(field_id)
            .or_else(|| self.schema.field(&self.schema.namespace(field_id)))
            .map(|field| self.value_key(field))
            .ok_or_else(|| Error::InvalidOperation(format!("Unknown field '{field_id}'")))
    }

    pub fn clear_error(&mut self, key: &str) {
        self.errors.remove(key);
    }

    // ─── Answer selection ────────────────────────────────────────────────

    /// Take the re-entrancy guard for an answer choice.
    ///
    /// Returns `None`, changing nothing, while another choice is pending.
    pub fn begin_choice(&mut self, question_id: &str, value: impl Into<RawValue>) -> Option<PendingChoice> {
        if self.choice_pending {
            debug!(question_id, "Ignoring answer while another is pending");
            return None;
        }
        self.choice_pending = true;
        Some(PendingChoice {
            question_id: question_id.to_string(),
            value: value.into(),
        })
    }

    /// Apply a pending choice and release the guard.
    pub fn settle_choice(&mut self, choice: PendingChoice) -> ChoiceOutcome {
        let outcome = self.apply_choice(choice);
        self.choice_pending = false;
        outcome
    }

    fn apply_choice(&mut self, choice: PendingChoice) -> ChoiceOutcome {
        let Some(id) = self.canonical_question_id(&choice.question_id).map(str::to_string) else {
            warn!(question_id = %choice.question_id, "Answer for unknown question");
            return ChoiceOutcome::UnknownQuestion;
        };
        let key = FormSchema::answer_key(&id);

        let editing_this = self.editing_question_id.as_deref() == Some(id.as_str());
        let same_value = self
            .values
            .get(&key)
            .is_some_and(|stored| *stored == choice.value || stored.matches_text(&choice.value.to_string()));
        if editing_this && same_value {
            self.finish_edit();
            return ChoiceOutcome::EditKept;
        }

        self.values.insert(key.clone(), choice.value);
        self.errors.remove(&key);

        if self.all_questions_answered() {
            self.stage = Stage::Answers;
            self.editing_question_id = None;
        } else {
            self.advance_question();
        }

        debug!(question_id = %id, stage = %self.stage, "Answer recorded");
        self.persist();
        ChoiceOutcome::Recorded { stage: self.stage }
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    /// Advance the global cursor; past the last question go to answers
    pub fn next_question(&mut self) {
        self.advance_question();
        self.persist();
    }

    fn advance_question(&mut self) {
        if self.global_question_index + 1 < self.schema.total_questions() {
            self.move_cursor(self.global_question_index + 1);
        } else {
            self.stage = Stage::Answers;
        }
    }

    pub fn prev_question(&mut self) {
        if self.global_question_index > 0 {
            self.move_cursor(self.global_question_index - 1);
        }
        self.persist();
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidOperation` when `index` is not a question.
    pub fn go_to_question(&mut self, index: usize) -> Result<()> {
        if index >= self.schema.total_questions() {
            return Err(Error::InvalidOperation(format!(
                "Question index {index} out of range (0..{})",
                self.schema.total_questions()
            )));
        }
        self.move_cursor(index);
        self.persist();
        Ok(())
    }

    fn move_cursor(&mut self, global: usize) {
        self.global_question_index = global;
        self.current_question_index = self.schema.local_index_of(global).unwrap_or(0);
    }

    /// Reopen a question for editing.
    ///
    /// `index_hint` is used when it addresses the same question; otherwise the
    /// question is located by id. Returns `false` for an unknown question and
    /// changes nothing; an existing edit overlay is kept.
    pub fn edit_answer(&mut self, question_id: &str, index_hint: usize) -> bool {
        let hinted = self
            .schema
            .question_at(index_hint)
            .filter(|field| field.id == question_id || field.id == self.schema.namespace(question_id))
            .map(|_| index_hint);

        let Some(index) = hinted.or_else(|| self.schema.global_index_of(question_id)) else {
            debug!(question_id, "Cannot edit unknown question");
            return false;
        };

        self.editing_question_id = self.schema.question_at(index).map(|field| field.id.clone());
        self.move_cursor(index);
        self.stage = Stage::Questions;
        self.persist();
        true
    }

    pub fn finish_edit(&mut self) {
        self.stage = Stage::Answers;
        self.editing_question_id = None;
        self.persist();
    }

    /// contact → questions → answers; entering questions rewinds the cursor
    pub fn next_section(&mut self) {
        let next = self.stage.next();
        if next != self.stage {
            self.stage = next;
            if next == Stage::Questions {
                self.move_cursor(0);
            }
            debug!(stage = %self.stage, "Moved to next section");
        }
        self.persist();
    }

    // ─── Validation ──────────────────────────────────────────────────────

    /// Validate the active section and advance when it is clean.
    pub fn validate_section(&mut self) -> SectionReport {
        self.errors.clear();

        let schema = Arc::clone(&self.schema);
        let fields: &[Field] = match self.stage {
            Stage::Contact => schema.contact_fields(),
            Stage::Questions => schema.question_fields(),
            Stage::Answers => &[],
        };
        self.validate_fields(fields);

        if self.errors.is_empty() && self.stage != Stage::Answers {
            self.next_section();
        } else {
            self.persist();
        }

        SectionReport {
            errors: self.errors.clone(),
            stage: self.stage,
        }
    }

    /// Validate every field and hand a clean form to `submitter`.
    ///
    /// With `show_answers_when_complete`, a fully answered form moves to the
    /// answers stage instead (used after a server round trip failed).
    ///
    /// # Errors
    ///
    /// `Error::Submission` when the submitter fails without field errors;
    /// scoring errors when the answers cannot be scored.
    pub fn validate_all(&mut self, submitter: &dyn Submitter, show_answers_when_complete: bool) -> Result<SubmitReport> {
        if self.submitted {
            debug!("Ignoring repeated submission");
            return Ok(SubmitReport::AlreadySubmitted);
        }

        self.errors.clear();
        let schema = Arc::clone(&self.schema);
        self.validate_fields(schema.contact_fields());
        self.validate_fields(schema.question_fields());

        if show_answers_when_complete && self.all_questions_answered() {
            self.stage = Stage::Answers;
            self.persist();
            return Ok(SubmitReport::ShowAnswers);
        }

        if !self.errors.is_empty() {
            self.jump_to_first_error();
            self.persist();
            return Ok(SubmitReport::Invalid(self.errors.clone()));
        }

        let submission = self.build_submission()?;
        match submitter.submit(&submission) {
            SubmitOutcome::Accepted => {
                info!(quiz = %submission.quiz, percentage = submission.result.percentage, "Form submitted");
                self.discard_snapshot();
                self.submitted = true;
                Ok(SubmitReport::Accepted(submission))
            }
            SubmitOutcome::Rejected(field_errors) if field_errors.is_empty() => {
                self.persist();
                Err(Error::Submission("Submission rejected without field errors".to_string()))
            }
            SubmitOutcome::Rejected(field_errors) => {
                for (key, message) in field_errors {
                    let key = self.error_key_for(&key);
                    self.errors.insert(key, message);
                }
                self.jump_to_first_error();
                self.persist();
                Ok(SubmitReport::Rejected(self.errors.clone()))
            }
            SubmitOutcome::Fatal(message) => {
                warn!(%message, "Submission failed");
                self.persist();
                Err(Error::Submission(message))
            }
        }
    }

    fn validate_fields(&mut self, fields: &[Field]) {
        for field in fields {
            let key = self.value_key(field);
            if let Err(invalid) = validator::validate(field, self.values.get(&key)) {
                let message = self.message_for(field, invalid);
                self.errors.insert(key, message);
            }
        }
    }

    fn value_key(&self, field: &Field) -> String {
        if field.is_question {
            FormSchema::answer_key(&field.id)
        } else {
            field.id.clone()
        }
    }

    fn message_for(&self, field: &Field, invalid: Invalid) -> String {
        match invalid {
            Invalid::Required if field.is_question => self.settings.answer_required_message.clone(),
            Invalid::Required => self.settings.required_message.clone(),
            Invalid::Type | Invalid::OutOfBounds | Invalid::Format => field.message.clone(),
        }
    }

    /// Server keys naming a question directly are moved onto its value key
    fn error_key_for(&self, key: &str) -> String {
        match self.schema.field(key) {
            Some(field) if field.is_question => FormSchema::answer_key(&field.id),
            _ => key.to_string(),
        }
    }

    fn jump_to_first_error(&mut self) {
        let Some(first) = self.errors.first_key().map(str::to_string) else {
            return;
        };

        if self.schema.is_question_key(&first) {
            self.stage = Stage::Questions;
            let question = FormSchema::question_id_from_key(&first).unwrap_or(&first);
            if let Some(index) = self.schema.global_index_of(question) {
                self.move_cursor(index);
            }
        } else {
            self.stage = Stage::Contact;
        }
        debug!(field = %first, stage = %self.stage, "Jumped to first error");
    }

    // ─── Payload ─────────────────────────────────────────────────────────

    /// Valid contact values, cast to their data types
    pub fn contact_payload(&self) -> BTreeMap<String, FieldValue> {
        self.schema
            .contact_fields()
            .iter()
            .filter_map(|field| {
                let value = validator::validate(field, self.values.get(&field.id)).ok()??;
                Some((field.id.clone(), value))
            })
            .collect()
    }

    /// Stored answers by namespaced question id
    pub fn answer_payload(&self) -> BTreeMap<String, String> {
        self.schema
            .question_ids()
            .filter_map(|id| {
                let value = self.values.get(&FormSchema::answer_key(id))?;
                (!value.is_blank()).then(|| (id.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Numeric score of each stored answer.
    ///
    /// # Errors
    ///
    /// Returns `Error::Scoring` when an answer is not numeric.
    pub fn answer_scores(&self) -> Result<BTreeMap<String, f64>> {
        self.answer_payload()
            .into_iter()
            .map(|(id, value)| parse_answer_value(&value).map(|score| (id, score)))
            .collect()
    }

    // Field state is per submission attempt: each value and score is written
    // once here and dropped with the request, so a resubmission starts clean.
    fn build_submission(&self) -> Result<Submission> {
        let mut contact = BTreeMap::new();
        for field in self.schema.contact_fields() {
            if let Ok(Some(value)) = validator::validate(field, self.values.get(&field.id)) {
                let mut state = FieldState::new();
                contact.insert(field.id.clone(), state.set_value(value).clone());
            }
        }

        let mut answers = BTreeMap::new();
        let mut scores = Vec::with_capacity(self.schema.total_questions());
        for field in self.schema.question_fields() {
            let key = FormSchema::answer_key(&field.id);
            let Ok(Some(value)) = validator::validate(field, self.values.get(&key)) else {
                continue;
            };
            let mut state = FieldState::new();
            let score = parse_answer_value(&state.set_value(value).to_string())?;
            scores.push(state.set_score(score));
            if let Some(value) = state.value() {
                answers.insert(field.id.clone(), value.to_string());
            }
        }

        let result = scoring::outcome(&scores, self.schema.result_bands(), self.settings.scoring)?;

        Ok(Submission {
            quiz: self.schema.slug().to_string(),
            contact,
            answers,
            result,
            submitted_at: self.clock.now(),
        })
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    fn persist(&self) {
        if self.submitted {
            return;
        }

        let snapshot = Snapshot {
            expires_at: self.clock.now() + self.settings.snapshot_ttl,
            values: self.values.clone(),
            current_section: self.stage,
            current_question_index: self.current_question_index,
            global_question_index: i64::try_from(self.global_question_index).unwrap_or(i64::MAX),
        };

        if let Err(e) = snapshot.encode().and_then(|data| self.store.persist(&data)) {
            warn!(error = %e, "Failed to persist form snapshot");
        }
    }
}
