//! Argument extraction and command dispatch

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::ArgMatches;

use super::build_cli;
use crate::commands::{
    check,
    run::{self, RunOptions},
    schema, score, ConfigOverrides, QuizContext, QuizOptions,
};

/// Parse the process arguments and run the chosen command
pub async fn run_cli() -> Result<()> {
    let matches = build_cli().get_matches();
    dispatch(&matches).await
}

pub async fn dispatch(matches: &ArgMatches) -> Result<()> {
    let Some((name, sub_m)) = matches.subcommand() else {
        anyhow::bail!("Unknown command. Run 'quizform --help' for usage.");
    };
    let context = QuizContext::load(&quiz_options(sub_m)?)?;
    let mut stdout = io::stdout().lock();

    match name {
        "check" => check::run(&context, &mut stdout),
        "schema" => schema::run(&context, sub_m.get_flag("json"), &mut stdout),
        "score" => {
            let answers: Vec<String> = sub_m
                .get_many::<String>("answers")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            score::run(&context, &answers, sub_m.get_flag("json"), &mut stdout).map(|_| ())
        }
        "run" => {
            let options = RunOptions {
                fresh: sub_m.get_flag("fresh"),
            };
            run::run(&context, options, io::stdin().lock(), &mut stdout)
                .await
                .map(|_| ())
        }
        other => anyhow::bail!("Unknown command '{other}'. Run 'quizform --help' for usage."),
    }
}

/// Global options as seen from a subcommand
fn quiz_options(matches: &ArgMatches) -> Result<QuizOptions> {
    let quiz = matches
        .get_one::<PathBuf>("quiz")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("--quiz <FILE> is required"))?;

    Ok(QuizOptions {
        quiz,
        slug: matches.get_one::<String>("slug").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        overrides: ConfigOverrides {
            id_prefix: matches.get_one::<String>("id-prefix").cloned(),
            max_answer_value: matches.get_one::<f64>("max-answer-value").copied(),
            snapshot_dir: matches.get_one::<String>("snapshot-dir").cloned(),
            outbox_dir: matches.get_one::<String>("outbox-dir").cloned(),
        },
    })
}
