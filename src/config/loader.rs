//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AnonymiserConfig;
use crate::domain::errors::AnonymiserError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AnonymiserConfig
/// 4. Applies environment variable overrides (ANONYMISER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use anonymiser::config::loader::load_config;
///
/// let config = load_config("anonymiser.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnonymiserConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AnonymiserError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AnonymiserError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration from a TOML string
///
/// Performs the same substitution, overrides and validation as
/// [`load_config`].
pub fn parse_config(contents: &str) -> Result<AnonymiserConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: AnonymiserConfig = toml::from_str(&contents)
        .map_err(|e| AnonymiserError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        AnonymiserError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap_or_else(|e| panic!("invalid pattern: {e}"))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(AnonymiserError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using ANONYMISER_* prefix
///
/// Environment variables follow the pattern: ANONYMISER_<SECTION>_<KEY>
/// For example: ANONYMISER_APPLICATION_LOG_LEVEL
fn apply_env_overrides(config: &mut AnonymiserConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("ANONYMISER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Auto-redact overrides
    if let Ok(val) = std::env::var("ANONYMISER_AUTO_REDACT_TEXT_LENGTH") {
        config.auto_redact.text_length = val.parse().map_err(|_| {
            AnonymiserError::Configuration(format!(
                "ANONYMISER_AUTO_REDACT_TEXT_LENGTH must be a positive integer, got '{val}'"
            ))
        })?;
    }
    if let Ok(val) = std::env::var("ANONYMISER_AUTO_REDACT_FILL_CHAR") {
        let mut chars = val.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => config.auto_redact.fill_char = c,
            _ => {
                return Err(AnonymiserError::Configuration(format!(
                    "ANONYMISER_AUTO_REDACT_FILL_CHAR must be a single character, got '{val}'"
                )))
            }
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("ANONYMISER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("ANONYMISER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("ANONYMISER_TEST_VAR", "test_value");
        let input = "fill = \"${ANONYMISER_TEST_VAR}\"\n# ${NOT_SUBSTITUTED}";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "fill = \"test_value\"\n# ${NOT_SUBSTITUTED}");
        std::env::remove_var("ANONYMISER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::remove_var("ANONYMISER_MISSING_VAR");
        let input = "value = \"${ANONYMISER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("ANONYMISER_MISSING_VAR"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(AnonymiserError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let toml_content = r#"
[application]
log_level = "debug"

[auto_redact]
text_length = 20
disabled = ["JSONField"]

[[models]]
model = "tests.User"
fields = [
    { name = "id", type = "AutoField", primary_key = true },
    { name = "first_name", type = "CharField", max_length = 150 },
]
custom = { first_name = "FIRST_NAME" }
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.auto_redact.text_length, 20);
        assert_eq!(config.models.len(), 1);
        assert!(config.model("tests.User").is_some());
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("ANONYMISER_AUTO_REDACT_FILL_CHAR", "*");
        std::env::set_var("ANONYMISER_APPLICATION_LOG_LEVEL", "warn");
        let result = parse_config("");
        std::env::remove_var("ANONYMISER_AUTO_REDACT_FILL_CHAR");
        std::env::remove_var("ANONYMISER_APPLICATION_LOG_LEVEL");

        let config = result.unwrap();
        assert_eq!(config.auto_redact.fill_char, '*');
        assert_eq!(config.application.log_level, "warn");
    }

    #[test]
    fn test_invalid_fill_char_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("ANONYMISER_AUTO_REDACT_FILL_CHAR", "XY");
        let result = parse_config("");
        std::env::remove_var("ANONYMISER_AUTO_REDACT_FILL_CHAR");
        assert!(result.is_err());
    }
}
