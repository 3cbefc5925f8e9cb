//! Score an answer set without running a session

use std::io::Write;

use anyhow::Result;
use quizform_core::{definition::AnswerOption, scoring, Error, ScoreOutcome};

use super::QuizContext;

/// Score one answer per question, in question order.
///
/// # Errors
///
/// `Error::InvalidOperation` when the answer count differs from the question
/// count; scoring errors for unknown values or uncovered percentages.
pub fn run(context: &QuizContext, answers: &[String], json: bool, out: &mut impl Write) -> Result<ScoreOutcome> {
    let expected = context.definition.question_count();
    if answers.len() != expected {
        return Err(Error::InvalidOperation(format!(
            "Expected {expected} answers, got {}",
            answers.len()
        ))
        .into());
    }

    let options = &context.definition.answer_options;
    let values: Vec<&str> = answers
        .iter()
        .map(|answer| option_value(options, answer))
        .collect();
    let outcome = scoring::resolve(&values, &context.definition.result_bands, context.scoring()?)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&outcome)?)?;
    } else {
        writeln!(
            out,
            "Score: {} of {} ({}%)",
            outcome.total, outcome.max_possible, outcome.percentage
        )?;
        writeln!(out, "Result: {}", outcome.band.title)?;
        if !outcome.band.description.is_empty() {
            writeln!(out, "{}", outcome.band.description)?;
        }
    }
    Ok(outcome)
}

/// An option id stands for its value; anything else is taken as a value
fn option_value<'a>(options: &'a [AnswerOption], answer: &'a str) -> &'a str {
    options
        .iter()
        .find(|option| option.id == answer)
        .map_or(answer, |option| option.value.as_str())
}

#[cfg(test)]
mod tests {
    use quizform_core::{source::parse_definitions, Config, QuizDefinition};

    use super::*;

    const QUIZ: &str = r#"{
        "slug": "sleep",
        "questionSections": [{"title": "S", "questions": [{"text": "One?"}, {"text": "Two?"}]}],
        "answerOptions": [{"text": "Often", "value": "2"}, {"text": "Sometimes", "value": "1"}, {"text": "Never", "value": "0"}],
        "resultBands": [
            {"title": "Low", "description": "Sleep well", "minPercentage": 0, "maxPercentage": 49},
            {"title": "High", "description": "See someone", "minPercentage": 50, "maxPercentage": 100}
        ]
    }"#;

    fn context() -> Result<QuizContext> {
        let definition = parse_definitions(QUIZ)?
            .into_iter()
            .map(QuizDefinition::sanitize)
            .next()
            .unwrap_or_default();
        let mut config = Config::default();
        config.scoring.max_answer_value = Some(2.0);
        Ok(QuizContext { config, definition })
    }

    fn answers(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_scores_against_configured_maximum() -> Result<()> {
        let mut out = Vec::new();
        let outcome = run(&context()?, &answers(&["2", "0"]), false, &mut out)?;
        assert!((outcome.percentage - 50.0).abs() < f64::EPSILON);
        assert_eq!(outcome.band.title, "High");

        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Score: 2 of 4 (50%)"));
        assert!(text.contains("See someone"));
        Ok(())
    }

    #[test]
    fn test_option_ids_stand_for_values() -> Result<()> {
        let mut out = Vec::new();
        let outcome = run(&context()?, &answers(&["a3", "a2"]), true, &mut out)?;
        assert!((outcome.total - 1.0).abs() < f64::EPSILON);
        let value: serde_json::Value = serde_json::from_slice(&out)?;
        assert_eq!(value["band"]["title"], "Low");
        Ok(())
    }

    #[test]
    fn test_configured_maximum_wins() -> Result<()> {
        let mut context = context()?;
        context.config.scoring.max_answer_value = Some(4.0);
        let outcome = run(&context, &answers(&["2", "2"]), false, &mut Vec::new())?;
        assert!((outcome.percentage - 50.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_missing_maximum_is_a_config_error() -> Result<()> {
        let mut context = context()?;
        context.config.scoring.max_answer_value = None;
        let result = run(&context, &answers(&["2", "0"]), false, &mut Vec::new());
        let err = result.err().map(|e| e.downcast::<Error>().ok());
        assert!(matches!(err, Some(Some(Error::InvalidConfig(_)))));
        Ok(())
    }

    #[test]
    fn test_wrong_answer_count_is_rejected() -> Result<()> {
        let result = run(&context()?, &answers(&["1"]), false, &mut Vec::new());
        let err = result.err().map(|e| e.downcast::<Error>().ok());
        assert!(matches!(err, Some(Some(Error::InvalidOperation(_)))));
        Ok(())
    }
}
