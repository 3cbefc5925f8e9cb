//! End-to-end form session flows against in-memory collaborators

use std::{collections::BTreeMap, sync::Arc, sync::Mutex};

use chrono::{Duration, Utc};
use quizform_core::{
    session::{RestoreOutcome, DEFAULT_REQUIRED_MESSAGE},
    source::{parse_definitions, select_definition},
    ChoiceOutcome, Clock, Error, FixedClock, FormSchema, FormSession, MemoryStore, RawValue, Result,
    SchemaConfig, ScoringConfig, SessionSettings, SnapshotStore, Stage, SubmitOutcome, SubmitReport, Submission,
    Submitter,
};

const QUIZ: &str = r#"{
    "title": "Sleep check",
    "slug": "sleep",
    "description": "How rested are you?",
    "instructions": "Pick one answer per question.",
    "contactFields": [
        {"id": "name", "name": "Name", "type": "text", "required": true},
        {"id": "email", "name": "Email", "type": "email", "required": true}
    ],
    "questionSections": [
        {"id": "s1", "title": "Nights", "questions": [
            {"id": "q1", "text": "Do you sleep 7 hours?"},
            {"id": "q2", "text": "Do you wake up rested?"}
        ]}
    ],
    "answerOptions": [
        {"text": "Yes", "value": "1"},
        {"text": "No", "value": "0"}
    ],
    "resultBands": [
        {"title": "Tired", "description": "Rest more", "minPercentage": 0, "maxPercentage": 39},
        {"title": "Fine", "description": "Keep going", "minPercentage": 40, "maxPercentage": 60},
        {"title": "Rested", "description": "Great", "minPercentage": 61, "maxPercentage": 100}
    ]
}"#;

struct RecordingSubmitter {
    outcome: SubmitOutcome,
    received: Mutex<Vec<Submission>>,
}

impl RecordingSubmitter {
    fn new(outcome: SubmitOutcome) -> Self {
        Self {
            outcome,
            received: Mutex::new(Vec::new()),
        }
    }

    fn received(&self) -> Vec<Submission> {
        self.received
            .lock()
            .map(|received| received.clone())
            .unwrap_or_default()
    }
}

impl Submitter for RecordingSubmitter {
    fn submit(&self, submission: &Submission) -> SubmitOutcome {
        if let Ok(mut received) = self.received.lock() {
            received.push(submission.clone());
        }
        self.outcome.clone()
    }
}

struct Harness {
    schema: Arc<FormSchema>,
    store: Arc<MemoryStore>,
    clock: Arc<FixedClock>,
}

impl Harness {
    fn new() -> Result<Self> {
        Self::with_store(MemoryStore::new())
    }

    fn with_store(store: MemoryStore) -> Result<Self> {
        let definition = select_definition(parse_definitions(QUIZ)?, Some("sleep"))?;
        Ok(Self {
            schema: Arc::new(FormSchema::build(&definition, &SchemaConfig::default())?),
            store: Arc::new(store),
            clock: Arc::new(FixedClock::new(Utc::now())),
        })
    }

    fn session(&self) -> Result<FormSession> {
        Ok(FormSession::init(
            Arc::clone(&self.schema),
            SessionSettings::new(ScoringConfig::new(1.0)?),
            self.store.clone(),
            self.clock.clone(),
        ))
    }
}

fn choose(session: &mut FormSession, question: &str, value: &str) -> ChoiceOutcome {
    session
        .begin_choice(question, value)
        .map_or(ChoiceOutcome::Suppressed, |pending| session.settle_choice(pending))
}

fn completed_session(harness: &Harness) -> Result<FormSession> {
    let mut session = harness.session()?;
    session.set_value("name", "Ada Lovelace")?;
    session.set_value("email", "a@b.com")?;
    session.validate_section();
    choose(&mut session, "q1", "1");
    choose(&mut session, "q2", "0");
    Ok(session)
}

#[test]
fn test_end_to_end_submission() -> Result<()> {
    let harness = Harness::new()?;
    let mut session = harness.session()?;

    session.set_value("name", "")?;
    session.set_value("email", "a@b.com")?;
    let report = session.validate_section();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors.get("qsf_name"), Some(DEFAULT_REQUIRED_MESSAGE));
    assert_eq!(session.stage(), Stage::Contact);

    session.set_value("name", "Ada")?;
    let report = session.validate_section();
    assert!(report.is_valid());
    assert_eq!(session.stage(), Stage::Questions);

    choose(&mut session, "qsf_q1", "1");
    assert_eq!(
        choose(&mut session, "qsf_q2", "0"),
        ChoiceOutcome::Recorded {
            stage: Stage::Answers
        }
    );
    assert!(session.all_questions_answered());

    let submitter = RecordingSubmitter::new(SubmitOutcome::Accepted);
    let report = session.validate_all(&submitter, false)?;
    assert!(matches!(report, SubmitReport::Accepted(_)));

    let received = submitter.received();
    assert_eq!(received.len(), 1);
    let submission = &received[0];
    assert_eq!(submission.quiz, "sleep");
    assert_eq!(submission.contact.len(), 2);
    assert_eq!(
        submission.answers,
        BTreeMap::from([
            ("qsf_q1".to_string(), "1".to_string()),
            ("qsf_q2".to_string(), "0".to_string()),
        ])
    );
    assert!((submission.result.percentage - 50.0).abs() < f64::EPSILON);
    assert_eq!(submission.result.band.title, "Fine");
    assert_eq!(submission.submitted_at, harness.clock.now());

    assert!(session.is_submitted());
    assert!(harness.store.contents().is_none());
    Ok(())
}

#[test]
fn test_repeated_submission_is_ignored() -> Result<()> {
    let harness = Harness::new()?;
    let mut session = completed_session(&harness)?;
    let submitter = RecordingSubmitter::new(SubmitOutcome::Accepted);
    session.validate_all(&submitter, false)?;
    assert_eq!(
        session.validate_all(&submitter, false)?,
        SubmitReport::AlreadySubmitted
    );
    assert_eq!(submitter.received().len(), 1);
    Ok(())
}

#[test]
fn test_local_errors_jump_to_first_error() -> Result<()> {
    let harness = Harness::new()?;
    let mut session = harness.session()?;
    session.set_value("name", "Ada")?;
    session.set_value("email", "a@b.com")?;
    session.validate_section();
    choose(&mut session, "q1", "1");

    let submitter = RecordingSubmitter::new(SubmitOutcome::Accepted);
    let report = session.validate_all(&submitter, false)?;
    let SubmitReport::Invalid(errors) = report else {
        return Err(Error::InvalidOperation(format!("unexpected report {report:?}")));
    };
    assert_eq!(errors.first_key(), Some("question-qsf_q2"));
    assert_eq!(session.stage(), Stage::Questions);
    assert_eq!(session.global_question_index(), 1);
    assert!(submitter.received().is_empty());
    Ok(())
}

#[test]
fn test_contact_error_jumps_to_contact() -> Result<()> {
    let harness = Harness::new()?;
    let mut session = completed_session(&harness)?;
    session.set_value("email", "not-an-email")?;

    let submitter = RecordingSubmitter::new(SubmitOutcome::Accepted);
    let report = session.validate_all(&submitter, false)?;
    assert!(matches!(report, SubmitReport::Invalid(_)));
    assert_eq!(session.stage(), Stage::Contact);
    assert_eq!(session.errors().get("qsf_email"), Some("Please enter your email"));
    Ok(())
}

#[test]
fn test_show_answers_when_complete() -> Result<()> {
    let harness = Harness::new()?;
    let mut session = completed_session(&harness)?;
    session.edit_answer("q1", 0);
    assert_eq!(session.stage(), Stage::Questions);

    let submitter = RecordingSubmitter::new(SubmitOutcome::Accepted);
    assert_eq!(session.validate_all(&submitter, true)?, SubmitReport::ShowAnswers);
    assert_eq!(session.stage(), Stage::Answers);
    assert!(submitter.received().is_empty());
    Ok(())
}

#[test]
fn test_rejected_question_key_moves_to_questions() -> Result<()> {
    let harness = Harness::new()?;
    let mut session = completed_session(&harness)?;
    let submitter = RecordingSubmitter::new(SubmitOutcome::Rejected(BTreeMap::from([(
        "qsf_q2".to_string(),
        "Answer no longer accepted".to_string(),
    )])));

    let report = session.validate_all(&submitter, false)?;
    assert!(matches!(report, SubmitReport::Rejected(_)));
    assert_eq!(
        session.errors().get("question-qsf_q2"),
        Some("Answer no longer accepted")
    );
    assert_eq!(session.stage(), Stage::Questions);
    assert_eq!(session.global_question_index(), 1);
    assert!(!session.is_submitted());
    Ok(())
}

#[test]
fn test_resubmission_carries_corrected_answer() -> Result<()> {
    let harness = Harness::new()?;
    let mut session = completed_session(&harness)?;
    let rejecting = RecordingSubmitter::new(SubmitOutcome::Rejected(BTreeMap::from([(
        "qsf_q2".to_string(),
        "Answer no longer accepted".to_string(),
    )])));
    assert!(matches!(
        session.validate_all(&rejecting, false)?,
        SubmitReport::Rejected(_)
    ));

    assert_eq!(
        choose(&mut session, "q2", "1"),
        ChoiceOutcome::Recorded { stage: Stage::Answers }
    );
    let accepting = RecordingSubmitter::new(SubmitOutcome::Accepted);
    assert!(matches!(
        session.validate_all(&accepting, false)?,
        SubmitReport::Accepted(_)
    ));

    let first = rejecting.received();
    let second = accepting.received();
    assert_eq!(first[0].answers.get("qsf_q2").map(String::as_str), Some("0"));
    assert_eq!(second[0].answers.get("qsf_q2").map(String::as_str), Some("1"));
    assert!((second[0].result.percentage - 100.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn test_rejection_without_field_errors_is_an_error() -> Result<()> {
    let harness = Harness::new()?;
    let mut session = completed_session(&harness)?;
    let submitter = RecordingSubmitter::new(SubmitOutcome::Rejected(BTreeMap::new()));
    assert!(matches!(
        session.validate_all(&submitter, false),
        Err(Error::Submission(_))
    ));
    Ok(())
}

#[test]
fn test_fatal_submission_keeps_snapshot() -> Result<()> {
    let harness = Harness::new()?;
    let mut session = completed_session(&harness)?;
    let submitter = RecordingSubmitter::new(SubmitOutcome::Fatal("503".to_string()));

    assert!(matches!(
        session.validate_all(&submitter, false),
        Err(Error::Submission(message)) if message == "503"
    ));
    assert!(harness.store.contents().is_some());
    assert_eq!(session.stage(), Stage::Answers);

    let resumed = harness.session()?;
    assert_eq!(resumed.answer("q2"), Some(&RawValue::from("0")));
    Ok(())
}

#[test]
fn test_session_resumes_from_snapshot() -> Result<()> {
    let harness = Harness::new()?;
    {
        let mut session = harness.session()?;
        session.set_value("name", "Ada")?;
        session.set_value("email", "a@b.com")?;
        session.validate_section();
        choose(&mut session, "q1", "1");
    }

    harness.clock.advance(Duration::minutes(5));
    let mut resumed = harness.session()?;
    assert_eq!(resumed.stage(), Stage::Questions);
    assert_eq!(resumed.global_question_index(), 1);
    assert_eq!(resumed.value("qsf_name"), Some(&RawValue::from("Ada")));
    assert_eq!(
        resumed.restore(),
        RestoreOutcome::Restored { global_index: true }
    );
    Ok(())
}

#[test]
fn test_expired_snapshot_is_cleared() -> Result<()> {
    let harness = Harness::new()?;
    {
        let mut session = harness.session()?;
        session.set_value("name", "Ada")?;
    }

    harness.clock.advance(Duration::minutes(10));
    let resumed = harness.session()?;
    assert!(resumed.values().is_empty());
    assert_eq!(resumed.stage(), Stage::Contact);
    assert!(harness.store.contents().is_none());
    Ok(())
}

#[test]
fn test_corrupt_snapshot_falls_back_to_first_unanswered() -> Result<()> {
    let harness = Harness::with_store(MemoryStore::with_contents("{\"expiresAt\": oops"))?;
    let mut session = harness.session()?;
    assert_eq!(session.global_question_index(), 0);
    assert_eq!(session.stage(), Stage::Contact);
    assert!(harness.store.contents().is_none());
    assert_eq!(session.restore(), RestoreOutcome::Absent);
    Ok(())
}

#[test]
fn test_out_of_range_index_falls_back_to_start() -> Result<()> {
    let expires = (Utc::now() + Duration::hours(1)).to_rfc3339();
    let snapshot = format!(
        r#"{{"expiresAt":"{expires}","values":{{"question-qsf_q1":"1"}},"currentSection":"questions","currentQuestionIndex":0,"globalQuestionIndex":42}}"#
    );
    let harness = Harness::with_store(MemoryStore::with_contents(snapshot))?;
    let mut session = harness.session()?;
    assert_eq!(session.stage(), Stage::Questions);
    assert_eq!(session.global_question_index(), 0);
    assert_eq!(
        session.restore(),
        RestoreOutcome::Restored { global_index: false }
    );
    assert_eq!(session.global_question_index(), 0);
    Ok(())
}

#[test]
fn test_empty_store_resumes_at_first_unanswered() -> Result<()> {
    let harness = Harness::new()?;
    let mut session = harness.session()?;
    session.set_value("name", "Ada")?;
    session.set_value("email", "a@b.com")?;
    session.validate_section();
    choose(&mut session, "q1", "1");
    assert!(session.edit_answer("q1", 0));
    assert_eq!(session.global_question_index(), 0);

    harness.store.clear()?;
    assert_eq!(session.restore(), RestoreOutcome::Absent);
    assert_eq!(session.stage(), Stage::Questions);
    assert_eq!(session.global_question_index(), 1);
    Ok(())
}
