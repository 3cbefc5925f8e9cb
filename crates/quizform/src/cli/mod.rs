pub mod error;
pub mod handlers;
pub mod setup;

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("quizform")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run, score and check multi-step quiz forms")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("quiz")
                .long("quiz")
                .short('q')
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("JSON file holding one quiz definition or an array of them"),
        )
        .arg(
            Arg::new("slug")
                .long("slug")
                .short('s')
                .value_name("SLUG")
                .global(true)
                .help("Quiz to use when the file holds several (default: the first)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Project config file (default: .quizform/config.toml)"),
        )
        .arg(
            Arg::new("id-prefix")
                .long("id-prefix")
                .value_name("PREFIX")
                .global(true)
                .help("Namespace prefix for field ids"),
        )
        .arg(
            Arg::new("max-answer-value")
                .long("max-answer-value")
                .value_name("N")
                .value_parser(value_parser!(f64))
                .global(true)
                .help("Highest score one answer can contribute"),
        )
        .arg(
            Arg::new("snapshot-dir")
                .long("snapshot-dir")
                .value_name("DIR")
                .global(true)
                .help("Directory saved progress is kept in"),
        )
        .arg(
            Arg::new("outbox-dir")
                .long("outbox-dir")
                .value_name("DIR")
                .global(true)
                .help("Directory finished submissions are written to"),
        )
        .subcommand(cmd_check())
        .subcommand(cmd_schema())
        .subcommand(cmd_score())
        .subcommand(cmd_run())
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of text")
}

fn cmd_check() -> Command {
    Command::new("check").about("Report problems that block publishing the quiz")
}

fn cmd_schema() -> Command {
    Command::new("schema")
        .about("Print the form schema derived from the quiz")
        .arg(json_flag())
}

fn cmd_score() -> Command {
    Command::new("score")
        .about("Score one answer per question and print the matching result")
        .arg(
            Arg::new("answers")
                .value_name("ANSWER")
                .num_args(1..)
                .required(true)
                .help("Answer option values or ids, in question order"),
        )
        .arg(json_flag())
}

fn cmd_run() -> Command {
    Command::new("run")
        .about("Fill in the form interactively")
        .arg(
            Arg::new("fresh")
                .long("fresh")
                .action(ArgAction::SetTrue)
                .help("Discard saved progress before starting"),
        )
}
