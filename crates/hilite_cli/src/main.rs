//! hilite CLI
//!
//! Runs the built-in highlighting visitors over bracket-language sources.

mod cli;
mod commands;
mod output;
mod visitors;

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match &cli.command {
        Commands::Check {
            files,
            format,
            dumb,
            force_parents,
            range,
            threads,
        } => commands::check::run_check(
            &cli,
            files,
            commands::check::CheckOptions {
                format: *format,
                dumb: *dumb,
                force_parents: *force_parents,
                range: *range,
                threads: *threads,
            },
        ),
        Commands::Tree { file, json } => commands::tree::run_tree(file, *json).map(|_| false),
        Commands::Init { force } => commands::init::run_init(*force).map(|_| false),
    }
}
