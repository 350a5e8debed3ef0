use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use tracing::error;
use tutorhub::interfaces::cli::{self, Cli};
use tutorhub::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose).into_diagnostic()?;

    if let Err(e) = cli::run(cli).await {
        // Full detail goes to the log, the user gets the friendly version.
        error!(error = %e, "Command failed");
        return Err(miette!("{}", e.user_message()));
    }
    Ok(())
}
