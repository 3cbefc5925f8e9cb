//! Logging setup

use anyhow::Result;

/// Initialize the tracing subscriber.
///
/// Honors `RUST_LOG`, defaults to INFO and writes to stderr so it never
/// mixes with prompts or JSON on stdout.
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}
