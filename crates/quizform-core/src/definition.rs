//! Quiz definition model
//!
//! The authored quiz document supplied by the host application: contact
//! fields, question sections, the shared answer options and the result bands.
//! It is read-only for the form core. This module also carries the
//! authoring-time normalization (default ids, slugs) and the publication
//! checks an authoring tool runs before a quiz goes live.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════
// DEFINITION TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// A complete quiz as authored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizDefinition {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub instructions: String,
    pub contact_fields: Vec<ContactFieldDef>,
    pub question_sections: Vec<QuestionSectionDef>,
    pub answer_options: Vec<AnswerOption>,
    pub result_bands: Vec<ResultBand>,
}

/// UI input type declared for a contact field
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Email,
    Tel,
    Textarea,
    Checkbox,
    Select,
    Radio,
    Number,
}

/// A contact datum requested before the questions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFieldDef {
    pub id: String,
    pub name: String,
    pub placeholder: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub required: bool,
    pub options: Vec<String>,
}

/// An ordered group of questions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionSectionDef {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub questions: Vec<QuestionDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionDef {
    pub id: String,
    pub text: String,
}

/// One selectable answer, shared by every question.
///
/// `value` is the score contribution and is kept as authored text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    pub value: String,
}

/// A percentage range mapped to an outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultBand {
    pub id: String,
    pub title: String,
    pub description: String,
    pub min_percentage: f64,
    pub max_percentage: f64,
}

impl ResultBand {
    /// Inclusive on both ends
    pub fn contains(&self, percentage: f64) -> bool {
        self.min_percentage <= percentage && percentage <= self.max_percentage
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SANITIZATION
// ═══════════════════════════════════════════════════════════════════════════

impl QuizDefinition {
    /// Normalize an authored definition.
    ///
    /// Trims text, fills blank ids with positional defaults (`s1`, `s1-q2`,
    /// `a1`, `r1`), derives section slugs from titles and drops answer options
    /// or result bands that are missing their text.
    pub fn sanitize(self) -> Self {
        let question_sections = self
            .question_sections
            .into_iter()
            .enumerate()
            .map(|(index, section)| {
                let default_id = format!("s{}", index + 1);
                let title = section.title.trim().to_string();
                let questions = section
                    .questions
                    .into_iter()
                    .enumerate()
                    .map(|(q_index, question)| QuestionDef {
                        id: or_default(&question.id, || {
                            format!("{default_id}-q{}", q_index + 1)
                        }),
                        text: question.text.trim().to_string(),
                    })
                    .collect();
                QuestionSectionDef {
                    id: or_default(&section.id, || default_id.clone()),
                    slug: generate_slug(&title),
                    title,
                    questions,
                }
            })
            .collect();

        let answer_options = self
            .answer_options
            .into_iter()
            .filter(|answer| !answer.text.trim().is_empty() && !answer.value.trim().is_empty())
            .enumerate()
            .map(|(index, answer)| AnswerOption {
                id: or_default(&answer.id, || format!("a{}", index + 1)),
                text: answer.text.trim().to_string(),
                value: answer.value.trim().to_string(),
            })
            .collect();

        let result_bands = self
            .result_bands
            .into_iter()
            .filter(|band| !band.title.trim().is_empty() && !band.description.trim().is_empty())
            .enumerate()
            .map(|(index, band)| ResultBand {
                id: or_default(&band.id, || format!("r{}", index + 1)),
                title: band.title.trim().to_string(),
                description: band.description.trim().to_string(),
                ..band
            })
            .collect();

        let contact_fields = self
            .contact_fields
            .into_iter()
            .map(|field| ContactFieldDef {
                id: field.id.trim().to_string(),
                name: field.name.trim().to_string(),
                placeholder: field.placeholder.trim().to_string(),
                ..field
            })
            .collect();

        Self {
            title: self.title.trim().to_string(),
            slug: self.slug.trim().to_string(),
            description: self.description.trim().to_string(),
            instructions: self.instructions.trim().to_string(),
            contact_fields,
            question_sections,
            answer_options,
            result_bands,
        }
    }

    /// Total number of questions across all sections
    pub fn question_count(&self) -> usize {
        self.question_sections
            .iter()
            .map(|section| section.questions.len())
            .sum()
    }
}

fn or_default(id: &str, default: impl FnOnce() -> String) -> String {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        default()
    } else {
        trimmed.to_string()
    }
}

/// Derive a URL slug from a title.
///
/// Lower-cases, keeps `[a-z0-9]`, whitespace and `-`, then collapses
/// whitespace and dash runs into single dashes.
pub fn generate_slug(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    kept.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// ═══════════════════════════════════════════════════════════════════════════
// AUTHORING CHECKS
// ═══════════════════════════════════════════════════════════════════════════

/// A problem that blocks publishing a quiz
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthoringIssue {
    #[error("Description is required.")]
    MissingDescription,

    #[error("Instructions are required.")]
    MissingInstructions,

    #[error("At least one section with a question is required.")]
    NoSections,

    #[error("At least one question is required in a section.")]
    NoQuestions,

    #[error("At least one answer option is required.")]
    NoAnswerOptions,

    #[error("At least one result is required.")]
    NoResultBands,

    #[error("Answer option '{id}' has a non-numeric value '{value}'.")]
    NonNumericAnswer { id: String, value: String },

    #[error("Result '{id}' has an invalid range {min}-{max}.")]
    InvalidBandRange { id: String, min: f64, max: f64 },

    #[error("Results '{first}' and '{second}' overlap.")]
    OverlappingBands { first: String, second: String },

    #[error("No result covers percentages between {from} and {to}.")]
    BandGap { from: f64, to: f64 },
}

impl QuizDefinition {
    /// Run the publication rules and return every violation found.
    pub fn check_authoring(&self) -> Vec<AuthoringIssue> {
        let mut issues = Vec::new();

        if self.description.trim().is_empty() {
            issues.push(AuthoringIssue::MissingDescription);
        }
        if self.instructions.trim().is_empty() {
            issues.push(AuthoringIssue::MissingInstructions);
        }

        if self.question_sections.is_empty() {
            issues.push(AuthoringIssue::NoSections);
        } else if self.question_count() == 0 {
            issues.push(AuthoringIssue::NoQuestions);
        }

        if self.answer_options.is_empty() {
            issues.push(AuthoringIssue::NoAnswerOptions);
        }
        issues.extend(
            self.answer_options
                .iter()
                .filter(|answer| answer.value.trim().parse::<f64>().map_or(true, |v| !v.is_finite()))
                .map(|answer| AuthoringIssue::NonNumericAnswer {
                    id: answer.id.clone(),
                    value: answer.value.clone(),
                }),
        );

        if self.result_bands.is_empty() {
            issues.push(AuthoringIssue::NoResultBands);
        } else {
            issues.extend(check_band_coverage(&self.result_bands));
        }

        issues
    }
}

/// Bands must be well-formed, must not overlap and must cover 0..=100.
///
/// Percentages are whole numbers, so `next.min == prev.max + 1` is contiguous.
fn check_band_coverage(bands: &[ResultBand]) -> Vec<AuthoringIssue> {
    let mut issues: Vec<AuthoringIssue> = bands
        .iter()
        .filter(|band| {
            band.min_percentage > band.max_percentage
                || band.min_percentage < 0.0
                || band.max_percentage > 100.0
        })
        .map(|band| AuthoringIssue::InvalidBandRange {
            id: band.id.clone(),
            min: band.min_percentage,
            max: band.max_percentage,
        })
        .collect();

    if !issues.is_empty() {
        return issues;
    }

    let mut sorted: Vec<&ResultBand> = bands.iter().collect();
    sorted.sort_by(|a, b| a.min_percentage.total_cmp(&b.min_percentage));

    if let Some(first) = sorted.first() {
        if first.min_percentage > 0.0 {
            issues.push(AuthoringIssue::BandGap {
                from: 0.0,
                to: first.min_percentage,
            });
        }
    }

    for pair in sorted.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next.min_percentage <= prev.max_percentage {
            issues.push(AuthoringIssue::OverlappingBands {
                first: prev.id.clone(),
                second: next.id.clone(),
            });
        } else if next.min_percentage > prev.max_percentage + 1.0 {
            issues.push(AuthoringIssue::BandGap {
                from: prev.max_percentage,
                to: next.min_percentage,
            });
        }
    }

    if let Some(last) = sorted.last() {
        let highest = sorted
            .iter()
            .map(|band| band.max_percentage)
            .fold(last.max_percentage, f64::max);
        if highest < 100.0 {
            issues.push(AuthoringIssue::BandGap {
                from: highest,
                to: 100.0,
            });
        }
    }

    issues
}
