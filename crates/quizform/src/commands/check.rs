//! Authoring checks for a quiz definition

use std::io::Write;

use anyhow::Result;
use quizform_core::Error;

use super::QuizContext;

/// Print every problem that blocks publishing.
///
/// # Errors
///
/// Returns `Error::Definition` when at least one problem was found.
pub fn run(context: &QuizContext, out: &mut impl Write) -> Result<()> {
    let definition = &context.definition;

    let mut problems: Vec<String> = definition
        .check_authoring()
        .iter()
        .map(ToString::to_string)
        .collect();
    if let Err(err) = context.schema() {
        problems.push(err.to_string());
    }

    if problems.is_empty() {
        writeln!(
            out,
            "Quiz '{}' is ready to publish ({} questions, {} results)",
            definition.slug,
            definition.question_count(),
            definition.result_bands.len()
        )?;
        return Ok(());
    }

    writeln!(out, "Quiz '{}' has {} problem(s):", definition.slug, problems.len())?;
    for problem in &problems {
        writeln!(out, "  - {problem}")?;
    }

    Err(Error::Definition(format!(
        "{} authoring problem(s) in quiz '{}'",
        problems.len(),
        definition.slug
    ))
    .into())
}
