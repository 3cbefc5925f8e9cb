//! Loading quiz definitions

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::{
    definition::QuizDefinition,
    error::{Error, Result},
};

/// Supplies the definition a form is built from
pub trait QuizSource: Send + Sync {
    /// Load a quiz by slug, or the first available quiz when `slug` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when no matching quiz exists.
    fn load_quiz(&self, slug: Option<&str>) -> Result<QuizDefinition>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionDocument {
    Many(Vec<QuizDefinition>),
    One(Box<QuizDefinition>),
}

/// Parse a JSON document holding one definition or an array of them.
///
/// # Errors
///
/// Returns `Error::Parse` on malformed JSON.
pub fn parse_definitions(json: &str) -> Result<Vec<QuizDefinition>> {
    let document: DefinitionDocument = serde_json::from_str(json)?;
    Ok(match document {
        DefinitionDocument::Many(definitions) => definitions,
        DefinitionDocument::One(definition) => vec![*definition],
    })
}

/// Pick a definition by slug and normalize it.
///
/// # Errors
///
/// Returns `Error::NotFound` when `slug` matches nothing or the list is empty.
pub fn select_definition(definitions: Vec<QuizDefinition>, slug: Option<&str>) -> Result<QuizDefinition> {
    let found = match slug {
        Some(slug) => definitions.into_iter().find(|definition| definition.slug.trim() == slug),
        None => definitions.into_iter().next(),
    };
    found
        .map(QuizDefinition::sanitize)
        .ok_or_else(|| Error::NotFound(format!("quiz '{}'", slug.unwrap_or("<any>"))))
}

/// Reads definitions from a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QuizSource for JsonFileSource {
    fn load_quiz(&self, slug: Option<&str>) -> Result<QuizDefinition> {
        let json = fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::NotFound(format!("definition file {}", self.path.display()))
            } else {
                Error::Io(format!("Failed to read {}: {e}", self.path.display()))
            }
        })?;

        let definitions = parse_definitions(&json)?;
        debug!(
            path = %self.path.display(),
            count = definitions.len(),
            "Loaded quiz definitions"
        );
        select_definition(definitions, slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_QUIZZES: &str = r#"[
        {"title": "First", "slug": "first"},
        {"title": "  Second  ", "slug": "second", "questionSections": [{"title": "A B", "questions": [{"text": "Q"}]}]}
    ]"#;

    #[test]
    fn test_parse_single_or_array() -> Result<()> {
        assert_eq!(parse_definitions(r#"{"slug": "solo"}"#)?.len(), 1);
        assert_eq!(parse_definitions(TWO_QUIZZES)?.len(), 2);
        assert!(matches!(parse_definitions("[1, 2"), Err(Error::Parse(_))));
        Ok(())
    }

    #[test]
    fn test_select_by_slug_sanitizes() -> Result<()> {
        let quiz = select_definition(parse_definitions(TWO_QUIZZES)?, Some("second"))?;
        assert_eq!(quiz.title, "Second");
        assert_eq!(quiz.question_sections[0].slug, "a-b");
        assert_eq!(quiz.question_sections[0].questions[0].id, "s1-q1");
        Ok(())
    }

    #[test]
    fn test_select_without_slug_takes_first() -> Result<()> {
        let quiz = select_definition(parse_definitions(TWO_QUIZZES)?, None)?;
        assert_eq!(quiz.slug, "first");
        Ok(())
    }

    #[test]
    fn test_unknown_slug_is_not_found() -> Result<()> {
        let result = select_definition(parse_definitions(TWO_QUIZZES)?, Some("third"));
        assert!(matches!(result, Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_file_source() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("quizzes.json");
        fs::write(&path, TWO_QUIZZES)?;
        let source = JsonFileSource::new(&path);
        assert_eq!(source.load_quiz(Some("first"))?.title, "First");

        let missing = JsonFileSource::new(dir.path().join("nope.json"));
        assert!(matches!(missing.load_quiz(None), Err(Error::NotFound(_))));
        Ok(())
    }
}
