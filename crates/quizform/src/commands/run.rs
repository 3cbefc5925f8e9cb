//! Interactive form session on a line-based terminal
//!
//! Contact fields are prompted one by one, then each question with its
//! numbered answer options, then the answer overview where the form can be
//! submitted or an answer reopened. Progress is saved after every step, so
//! leaving (`q` or end of input) and running again resumes where it stopped.

use std::{
    fmt::Display,
    io::{BufRead, Lines, Write},
    sync::Arc,
};

use anyhow::Result;
use quizform_core::{
    definition::AnswerOption, DataType, Field, FileStore, FormController, FormSchema, FormSession,
    RawValue, SnapshotStore, Stage, SubmitReport, Submission, Submitter, SystemClock,
};
use tracing::{debug, info};

use super::QuizContext;
use crate::outbox::OutboxSubmitter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Discard saved progress before starting
    pub fresh: bool,
}

/// How an interactive session ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Submitted(Box<Submission>),
    /// Input ended or the user quit; progress stays saved
    Left,
}

/// Run the form against the configured snapshot directory and outbox.
///
/// # Errors
///
/// Fails when the quiz cannot be built or scored, on terminal I/O errors and
/// when the submission fails without field errors.
pub async fn run<R: BufRead, W: Write>(
    context: &QuizContext,
    options: RunOptions,
    input: R,
    output: W,
) -> Result<RunOutcome> {
    let schema = Arc::new(context.schema()?);
    let settings = context.config.session_settings(context.scoring()?);

    let store = Arc::new(FileStore::new(
        &context.config.storage.snapshot_dir,
        &context.config.form.storage_key,
    ));
    if options.fresh {
        store.clear()?;
        info!(path = %store.path().display(), "Discarded saved progress");
    }

    let session = FormSession::init(Arc::clone(&schema), settings, store, Arc::new(SystemClock));
    let controller = FormController::new(session, context.config.answer_debounce());
    let submitter = OutboxSubmitter::new(&context.config.storage.outbox_dir);

    run_session(&controller, &schema, &submitter, input, output).await
}

/// Drive one session until it is submitted or left.
///
/// # Errors
///
/// Terminal I/O errors, scoring errors and `Error::Submission`.
pub async fn run_session<R: BufRead, W: Write>(
    controller: &FormController,
    schema: &FormSchema,
    submitter: &dyn Submitter,
    input: R,
    output: W,
) -> Result<RunOutcome> {
    let mut term = Terminal::new(input, output);

    term.say(schema.title())?;
    if !schema.instructions().is_empty() {
        term.say(schema.instructions())?;
    }
    if controller.with_session(|s| !s.values().is_empty()).await {
        term.say("Resuming saved progress.")?;
    }

    loop {
        let stage = controller.with_session(|s| s.stage()).await;
        let step = match stage {
            Stage::Contact => contact_step(controller, schema, &mut term).await?,
            Stage::Questions => question_step(controller, schema, &mut term).await?,
            Stage::Answers => answers_step(controller, schema, submitter, &mut term).await?,
        };

        match step {
            Step::Continue => {}
            Step::Leave => {
                term.say("Progress saved.")?;
                return Ok(RunOutcome::Left);
            }
            Step::Submitted(submission) => return Ok(RunOutcome::Submitted(submission)),
        }
    }
}

enum Step {
    Continue,
    Leave,
    Submitted(Box<Submission>),
}

struct Terminal<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    /// `None` at end of input
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.out, "{text} ")?;
        self.out.flush()?;
        let line = self.lines.next().transpose()?;
        Ok(line.map(|line| line.trim().to_string()))
    }
}

// ─── Contact ─────────────────────────────────────────────────────────────

async fn contact_step<R: BufRead, W: Write>(
    controller: &FormController,
    schema: &FormSchema,
    term: &mut Terminal<R, W>,
) -> Result<Step> {
    let errors = controller.with_session(|s| s.errors().clone()).await;

    // After a failed round only the rejected fields are asked again
    for field in schema.contact_fields() {
        if !errors.is_empty() && !errors.contains_key(&field.id) {
            continue;
        }
        if let Some(message) = errors.get(&field.id) {
            term.say(format_args!("  ! {message}"))?;
        }

        let Some(line) = term.prompt(&contact_prompt(field))? else {
            return Ok(Step::Leave);
        };
        if line.is_empty() && !field.required {
            controller.with_session(|s| s.clear_value(&field.id)).await?;
            continue;
        }
        let value = contact_value(field, &line);
        controller.with_session(|s| s.set_value(&field.id, value)).await?;
    }

    let report = controller.with_session(FormSession::validate_section).await;
    if !report.is_valid() {
        term.say("Please correct the highlighted fields.")?;
    }
    Ok(Step::Continue)
}

fn contact_prompt(field: &Field) -> String {
    let required = if field.required { " *" } else { "" };
    let hint = if !field.options.is_empty() {
        format!(" [{}]", field.options.join("/"))
    } else if field.data_type == DataType::Bool {
        " [y/n]".to_string()
    } else if field.placeholder.is_empty() {
        String::new()
    } else {
        format!(" ({})", field.placeholder)
    };
    format!("{}{required}{hint}:", field.label)
}

fn contact_value(field: &Field, line: &str) -> RawValue {
    if field.data_type == DataType::Bool {
        match line.to_ascii_lowercase().as_str() {
            "y" | "yes" => return RawValue::Bool(true),
            "n" | "no" => return RawValue::Bool(false),
            _ => {}
        }
    }
    RawValue::from(line)
}

// ─── Questions ───────────────────────────────────────────────────────────

async fn question_step<R: BufRead, W: Write>(
    controller: &FormController,
    schema: &FormSchema,
    term: &mut Terminal<R, W>,
) -> Result<Step> {
    let (position, question, error) = controller
        .with_session(|s| {
            let question = s.current_question().cloned();
            let error = question
                .as_ref()
                .and_then(|q| s.errors().get(&FormSchema::answer_key(&q.id)).map(str::to_string));
            (s.global_question_index(), question, error)
        })
        .await;

    let Some(question) = question else {
        controller.with_session(FormSession::next_question).await;
        return Ok(Step::Continue);
    };

    term.say("")?;
    term.say(format_args!(
        "Question {}/{}: {}",
        position + 1,
        schema.total_questions(),
        question.label
    ))?;
    if let Some(message) = error {
        term.say(format_args!("  ! {message}"))?;
    }
    for (number, option) in schema.answer_options().iter().enumerate() {
        term.say(format_args!("  {}) {}", number + 1, option.text))?;
    }

    let Some(line) = term.prompt("Answer (b = back, q = quit):")? else {
        return Ok(Step::Leave);
    };
    match line.as_str() {
        "q" | "quit" => Ok(Step::Leave),
        "b" | "back" => {
            controller.with_session(FormSession::prev_question).await;
            Ok(Step::Continue)
        }
        choice => {
            match pick_option(schema.answer_options(), choice) {
                Some(value) => {
                    let outcome = controller.choose_answer(&question.id, value).await;
                    debug!(?outcome, question = %question.id, "Answer chosen");
                }
                None => term.say(format_args!(
                    "Pick a number from 1 to {}.",
                    schema.answer_options().len()
                ))?,
            }
            Ok(Step::Continue)
        }
    }
}

/// Answer value for a typed option number, option text or option value
fn pick_option(options: &[AnswerOption], input: &str) -> Option<String> {
    let by_number = input
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| options.get(index));

    by_number
        .or_else(|| {
            options
                .iter()
                .find(|option| option.text.eq_ignore_ascii_case(input))
        })
        .map(|option| option.value.clone())
}

// ─── Answers ─────────────────────────────────────────────────────────────

async fn answers_step<R: BufRead, W: Write>(
    controller: &FormController,
    schema: &FormSchema,
    submitter: &dyn Submitter,
    term: &mut Terminal<R, W>,
) -> Result<Step> {
    let answers = controller.with_session(|s| s.answer_payload()).await;

    term.say("")?;
    term.say("Your answers:")?;
    for (number, field) in schema.question_fields().iter().enumerate() {
        let label = answers
            .get(&field.id)
            .and_then(|value| schema.answer_label(value))
            .unwrap_or("-");
        term.say(format_args!("  {}. {}: {label}", number + 1, field.label))?;
    }

    let Some(line) = term.prompt("Submit (s), change an answer (e <number>) or quit (q):")? else {
        return Ok(Step::Leave);
    };
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["s" | "submit"] => submit(controller, schema, submitter, term).await,
        ["q" | "quit"] => Ok(Step::Leave),
        ["e" | "edit", number] => {
            let index = number
                .parse::<usize>()
                .ok()
                .and_then(|number| number.checked_sub(1));
            let reopened = match index.and_then(|index| schema.question_at(index).map(|q| (index, q))) {
                Some((index, question)) => {
                    controller
                        .with_session(|s| s.edit_answer(&question.id, index))
                        .await
                }
                None => false,
            };
            if !reopened {
                term.say(format_args!("There is no question {number}."))?;
            }
            Ok(Step::Continue)
        }
        _ => Ok(Step::Continue),
    }
}

async fn submit<R: BufRead, W: Write>(
    controller: &FormController,
    schema: &FormSchema,
    submitter: &dyn Submitter,
    term: &mut Terminal<R, W>,
) -> Result<Step> {
    let report = controller
        .with_session(|s| s.validate_all(submitter, false))
        .await?;

    match report {
        SubmitReport::Accepted(submission) => {
            let result = &submission.result;
            term.say("")?;
            term.say(format_args!(
                "Result: {} ({}%)",
                result.band.title, result.percentage
            ))?;
            if !result.band.description.is_empty() {
                term.say(&result.band.description)?;
            }
            Ok(Step::Submitted(Box::new(submission)))
        }
        SubmitReport::Rejected(errors) | SubmitReport::Invalid(errors) => {
            term.say("Some entries need attention:")?;
            for (key, message) in errors.iter() {
                term.say(format_args!("  ! {}: {message}", field_label(schema, key)))?;
            }
            Ok(Step::Continue)
        }
        SubmitReport::ShowAnswers => Ok(Step::Continue),
        SubmitReport::AlreadySubmitted => Ok(Step::Leave),
    }
}

fn field_label<'a>(schema: &'a FormSchema, key: &'a str) -> &'a str {
    let id = FormSchema::question_id_from_key(key).unwrap_or(key);
    schema.field(id).map_or(key, |field| field.label.as_str())
}
