//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the anonymiser configuration file.

use crate::anonymisation::registry_from_config;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Building the handlers catches errors the schema checks cannot
        let registry = match registry_from_config(&config) {
            Ok(r) => r,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Fill Character: {}", config.auto_redact.fill_char);
        println!("  Text Length: {}", config.auto_redact.text_length);
        if !config.auto_redact.disabled.is_empty() {
            let disabled: Vec<_> = config.auto_redact.disabled.iter().map(|t| t.to_string()).collect();
            println!("  Disabled Types: {}", disabled.join(", "));
        }
        println!("  Handled Models: {}", registry.known_types().len());
        for record_type in registry.known_types() {
            println!("    - {record_type}");
        }
        let unknown = registry.unknown_types();
        if !unknown.is_empty() {
            println!("  Declared Only: {}", unknown.len());
            for record_type in unknown {
                println!("    - {record_type}");
            }
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_missing_file() {
        let args = ValidateArgs {};
        assert_eq!(args.execute("does-not-exist.toml").unwrap(), 2);
    }

    #[test]
    fn test_validate_valid_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[[models]]
model = "tests.User"
fields = [{ name = "id", type = "AutoField", primary_key = true }]
"#,
        )
        .unwrap();
        file.flush().unwrap();

        let args = ValidateArgs {};
        assert_eq!(args.execute(file.path().to_str().unwrap()).unwrap(), 0);
    }
}
