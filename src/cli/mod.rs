//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the anonymiser using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Anonymiser - field-level anonymisation and redaction of stored records
#[derive(Parser, Debug)]
#[command(name = "anonymiser")]
#[command(version, about, long_about = None)]
#[command(author = "Anonymiser Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "anonymiser.toml", env = "ANONYMISER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ANONYMISER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Summarise how each configured model field is treated
    Describe(commands::describe::DescribeArgs),

    /// Redact a JSON export of records for one configured model
    Redact(commands::redact::RedactArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sql::SqlDialect;

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["anonymiser", "validate-config"]);
        assert_eq!(cli.config, "anonymiser.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["anonymiser", "--config", "custom.toml", "describe"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["anonymiser", "--log-level", "debug", "describe"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_describe() {
        let cli = Cli::parse_from(["anonymiser", "describe", "--anonymised-only"]);
        match cli.command {
            Commands::Describe(args) => assert!(args.anonymised_only),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_redact() {
        let cli = Cli::parse_from([
            "anonymiser",
            "redact",
            "--input",
            "rows.json",
            "--output",
            "out.json",
            "--model",
            "tests.User",
            "--set",
            "first_name=Anon",
            "--set",
            "location=",
            "--no-auto-redact",
        ]);
        match cli.command {
            Commands::Redact(args) => {
                assert_eq!(args.model, "tests.User");
                assert_eq!(
                    args.overrides,
                    vec![
                        ("first_name".to_string(), "Anon".to_string()),
                        ("location".to_string(), String::new()),
                    ]
                );
                assert!(args.no_auto_redact);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_redact_sql_without_files() {
        let cli = Cli::parse_from([
            "anonymiser", "redact", "-m", "tests.User", "--sql", "postgres",
        ]);
        match cli.command {
            Commands::Redact(args) => {
                assert_eq!(args.sql, Some(SqlDialect::Postgres));
                assert!(args.input.is_none());
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let missing_output =
            Cli::try_parse_from(["anonymiser", "redact", "-i", "rows.json", "-m", "tests.User"]);
        assert!(missing_output.is_err());

        let missing_input =
            Cli::try_parse_from(["anonymiser", "redact", "-o", "out.json", "-m", "tests.User"]);
        assert!(missing_input.is_err());
    }

    #[test]
    fn test_cli_parse_redact_rejects_bad_override() {
        let result = Cli::try_parse_from([
            "anonymiser", "redact", "-i", "a.json", "-o", "b.json", "-m", "tests.User", "--set", "oops",
        ]);
        assert!(result.is_err());
    }
}
