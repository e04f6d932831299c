//! Backup CLI - builds staged, optionally encrypted tar backups.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    // JSON goes to stderr too, so plain log lines stay off unless asked for.
    logging::init(cli.verbose, cli.quiet || (cli.json && cli.verbose == 0));

    let formatter = output::create_formatter(cli.json, cli.verbose > 0, cli.quiet);
    let show_progress = !cli.quiet && !cli.json;

    let (operation, result) = match &cli.command {
        cli::Commands::Build(args) => (
            "build",
            commands::build::execute(args, &*formatter, show_progress),
        ),
        cli::Commands::Restore(args) => ("restore", commands::restore::execute(args, &*formatter)),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            ("completion", Ok(()))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            formatter.format_error(operation, &e);
            ExitCode::FAILURE
        }
    }
}
