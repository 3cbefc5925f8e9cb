//! Scoring and result resolution
//!
//! `percentage = round(100 * sum / (max_answer_value * questions))`, then the
//! first result band (declaration order) containing it wins.

use serde::Serialize;

use crate::{
    definition::ResultBand,
    error::{Error, Result},
};

/// Explicit scoring parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    max_answer_value: f64,
}

impl ScoringConfig {
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` unless `max_answer_value` is finite and
    /// positive.
    pub fn new(max_answer_value: f64) -> Result<Self> {
        if max_answer_value.is_finite() && max_answer_value > 0.0 {
            Ok(Self { max_answer_value })
        } else {
            Err(Error::InvalidConfig(format!(
                "scoring.max_answer_value must be a positive number, got {max_answer_value}"
            )))
        }
    }

    pub const fn max_answer_value(self) -> f64 {
        self.max_answer_value
    }
}

/// A computed score and the band it falls in
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    pub total: f64,
    pub max_possible: f64,
    pub percentage: f64,
    pub band: ResultBand,
}

/// Parse an answer value as authored (`" 2 "` → 2.0)
///
/// # Errors
///
/// Returns `Error::Scoring` for non-numeric or non-finite values.
pub fn parse_answer_value(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| Error::Scoring(format!("Answer value '{value}' is not a number")))
}

/// Rounded percentage of the maximum possible score
///
/// # Errors
///
/// Returns `Error::Scoring` when there are no answers.
pub fn percentage(values: &[f64], config: ScoringConfig) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::Scoring("Cannot score a quiz with no questions".to_string()));
    }
    let total: f64 = values.iter().sum();
    let max_possible = config.max_answer_value * values.len() as f64;
    Ok((100.0 * total / max_possible).round())
}

/// First band, in declaration order, containing `percentage`
///
/// # Errors
///
/// Returns `Error::NoMatchingBand` when no band contains it.
pub fn match_band(percentage: f64, bands: &[ResultBand]) -> Result<&ResultBand> {
    bands
        .iter()
        .find(|band| band.contains(percentage))
        .ok_or(Error::NoMatchingBand { percentage })
}

/// Score a set of answer values against the result bands.
///
/// # Errors
///
/// `Error::Scoring` for no answers or a non-numeric answer,
/// `Error::NoMatchingBand` when the bands leave the percentage uncovered.
pub fn resolve<S: AsRef<str>>(
    answer_values: &[S],
    bands: &[ResultBand],
    config: ScoringConfig,
) -> Result<ScoreOutcome> {
    let values = answer_values
        .iter()
        .map(|value| parse_answer_value(value.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    outcome(&values, bands, config)
}

/// Score already-parsed answer values against the result bands.
///
/// # Errors
///
/// Same as [`resolve`], minus parsing.
pub fn outcome(values: &[f64], bands: &[ResultBand], config: ScoringConfig) -> Result<ScoreOutcome> {
    let percentage = percentage(values, config)?;
    let band = match_band(percentage, bands)?.clone();

    Ok(ScoreOutcome {
        total: values.iter().sum(),
        max_possible: config.max_answer_value * values.len() as f64,
        percentage,
        band,
    })
}
