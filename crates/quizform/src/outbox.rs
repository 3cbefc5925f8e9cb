//! Submitter that writes finished forms to a directory
//!
//! Each accepted submission becomes one pretty-printed JSON file named after
//! the quiz and the submission time. An existing file is never overwritten.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use quizform_core::{SubmitOutcome, Submission, Submitter};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct OutboxSubmitter {
    dir: PathBuf,
}

impl OutboxSubmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<quiz>-<UTC timestamp>.json`
    pub fn file_name(submission: &Submission) -> String {
        let quiz = if submission.quiz.is_empty() {
            "quiz"
        } else {
            submission.quiz.as_str()
        };
        format!(
            "{quiz}-{}.json",
            submission.submitted_at.format("%Y%m%dT%H%M%S%.3fZ")
        )
    }

    fn write(&self, submission: &Submission) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create outbox {}", self.dir.display()))?;

        let path = self.dir.join(Self::file_name(submission));
        let json = serde_json::to_string_pretty(submission)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

impl Submitter for OutboxSubmitter {
    fn submit(&self, submission: &Submission) -> SubmitOutcome {
        match self.write(submission) {
            Ok(path) => {
                info!(path = %path.display(), "Submission written to outbox");
                SubmitOutcome::Accepted
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "Outbox write failed");
                SubmitOutcome::Fatal(format!("{err:#}"))
            }
        }
    }
}
