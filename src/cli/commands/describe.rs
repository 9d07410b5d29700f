//! Describe command implementation
//!
//! Prints the handler registered for each configured model followed by a
//! markdown table per model showing how every field is treated.

use crate::anonymisation::{registry_from_config, report};
use crate::config::load_config;
use clap::Args;

/// Arguments for the describe command
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Only list models that have a handler
    #[arg(long)]
    pub anonymised_only: bool,
}

impl DescribeArgs {
    /// Execute the describe command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Describing configured models");

        let registry = match load_config(config_path).and_then(|c| registry_from_config(&c)) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        print!("{}", self.render(&registry));
        Ok(0)
    }

    fn render(&self, registry: &crate::anonymisation::Registry) -> String {
        let mut output = String::from("Models:\n");
        output.push_str(&report::format_console(&report::model_anonymisers(registry)));

        for (label, rows) in report::all_model_fields(registry, self.anonymised_only) {
            output.push_str(&format!("\n## {label}\n\n"));
            output.push_str(&report::format_markdown(&rows));
        }
        output
    }
}
