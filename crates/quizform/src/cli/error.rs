//! Error formatting and exit codes for CLI output

/// Format an error for user display (no stack traces)
///
/// Includes the first cause when it says something the top message does not.
#[must_use]
pub fn format_error(err: &anyhow::Error) -> String {
    let msg = err.to_string();

    match err.source().map(ToString::to_string) {
        Some(source_msg) if !source_msg.is_empty() && !msg.contains(&source_msg) => {
            format!("{msg}\nCause: {source_msg}")
        }
        _ => msg,
    }
}

/// Extract the process exit code from an error
///
/// # Exit Codes
/// * 1 - Invalid input or configuration
/// * 2 - IO, storage or submission failure
/// * 3 - Quiz or definition file not found
/// * 4 - Invalid state (unusable definition, scoring failure)
#[must_use]
pub fn get_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(core_err) = err.downcast_ref::<quizform_core::Error>() {
        return core_err.exit_code();
    }

    if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
        return if io_err.kind() == std::io::ErrorKind::NotFound {
            3
        } else {
            2
        };
    }

    1
}
