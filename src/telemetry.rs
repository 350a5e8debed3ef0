use crate::error::{MarketError, Result};
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// Logs go to stderr so that stdout carries only command output. `RUST_LOG`
/// overrides the level picked from `verbosity` (0 = info, 1 = debug, more = trace).
pub fn init_tracing(verbosity: u8) -> Result<()> {
    let default_directive = match verbosity {
        0 => "tutorhub=info",
        1 => "tutorhub=debug",
        _ => "tutorhub=trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(MarketError::InternalError)
}
