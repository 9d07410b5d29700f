// Anonymiser - field-level anonymisation and redaction of stored records
// Copyright (c) 2025 Anonymiser Contributors
// Licensed under the MIT License

use anonymiser::cli::{Cli, Commands};
use anonymiser::config::load_config;
use anonymiser::log_error_with_context;
use anonymiser::logging::{cli_logging_settings, init_logging};
use clap::Parser;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Commands report config errors themselves; logging falls back to console-only
    let config = load_config(&cli.config).ok();
    let (log_level, logging_config) = cli_logging_settings(cli.log_level.as_deref(), config.as_ref());
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Anonymiser");

    let exit_code = match execute_command(&cli) {
        Ok(code) => code,
        Err(e) => {
            log_error_with_context!(format!("{e:#}"), "Command execution failed");
            eprintln!("Error: {e:#}");
            5 // Fatal error exit code
        }
    };

    // process::exit skips destructors
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::ValidateConfig(args) => args.execute(&cli.config),
        Commands::Describe(args) => args.execute(&cli.config),
        Commands::Redact(args) => args.execute(&cli.config),
    }
}
