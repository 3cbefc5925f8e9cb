//! Quizform CLI
//!
//! Binary name: `quizform`

use std::process;

use quizform::cli::{
    error::{format_error, get_exit_code},
    handlers::run_cli,
    setup::init_tracing,
};

#[tokio::main]
async fn main() {
    if let Err(err) = init_tracing() {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Warning: {err}");
        }
    }

    if let Err(err) = run_cli().await {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {}", format_error(&err));
        }

        #[allow(clippy::exit)]
        process::exit(get_exit_code(&err));
    }
}
