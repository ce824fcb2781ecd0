//! `blockgrid`: edit grid page layouts from the command line.
//!
//! Loads a layout JSON document, applies one store operation, and writes the
//! document back. Logs go to stderr; command output goes to stdout.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use crate::commands::{CliError, Command, run_on_file};
use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "blockgrid", about = "Grid page layout builder")]
struct Cli {
    /// Layout document to operate on.
    #[arg(long, env = "BLOCKGRID_FILE")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: ignoring .env: {e}");
        }
    }

    let cli = Cli::parse();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => return fail(&CliError::from(e)),
    };
    init_tracing(config.log_level);

    let path = cli.file.unwrap_or_else(|| config.file.clone());
    match run_on_file(&path, cli.command, &config.grid) {
        Ok(output) => {
            if let Some(text) = output {
                println!("{text}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn init_tracing(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).with_target(false).init();
}

fn fail(e: &CliError) -> ExitCode {
    tracing::error!(code = e.code(), "command failed");
    eprintln!("error[{}]: {e}", e.code());
    ExitCode::FAILURE
}
