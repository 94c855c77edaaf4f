//! packmatrix -- acceptance test matrix runner.
//!
//! Loads configuration, initializes logging and dispatches to the
//! subcommand handlers in [`commands`]. The process exit code comes from
//! [`CliError::exit_code`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = commands::load_config(cli.config.as_deref()).await?;
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
        config.validate()?;
    }

    logging::init_tracing(&config.general).map_err(|e| CliError::Config(e.to_string()))?;
    tracing::debug!(?config, "configuration loaded");

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, config, &writer).await,
        Commands::List(args) => commands::list::execute(args, &config, &writer),
    }
}
