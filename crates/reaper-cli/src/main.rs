use std::process::ExitCode;

use clap::Parser;
use eyre::Result;

mod cli;
mod commands;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Destroy(args) => match commands::destroy::run(args).await {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(error = %e, "destroy failed");
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
    };

    Ok(exit_code)
}
