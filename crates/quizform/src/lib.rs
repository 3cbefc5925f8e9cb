//! Quizform - terminal front end for quiz forms
//!
//! Loads a quiz definition, reports authoring problems, prints the derived
//! form schema, scores answer sets and runs a form session interactively.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod outbox;

pub use outbox::OutboxSubmitter;
