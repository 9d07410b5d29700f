//! Integration tests for logging functionality

use anonymiser::config::LoggingConfig;
use anonymiser::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "./logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_init_logging_with_file_output() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(test = "logging_integration", "Written to file");
    assert!(log_path.is_dir());

    // a second global subscriber is refused
    assert!(init_logging("info", &LoggingConfig::default()).is_err());
    drop(guard);
}

#[test]
fn test_init_logging_invalid_level() {
    assert!(init_logging("verbose", &LoggingConfig::default()).is_err());
}

#[test]
fn test_cli_settings_follow_config_file() {
    use anonymiser::config::parse_config;
    use anonymiser::logging::cli_logging_settings;

    let config = parse_config(
        r#"
[application]
log_level = "debug"

[logging]
local_enabled = true
local_path = "/tmp/anonymiser-logs"
local_rotation = "never"
"#,
    )
    .unwrap();

    let (level, logging) = cli_logging_settings(None, Some(&config));
    assert_eq!(level, "debug");
    assert!(logging.local_enabled);
    assert_eq!(logging.local_path, "/tmp/anonymiser-logs");
    assert_eq!(logging.local_rotation, "never");

    let (level, _) = cli_logging_settings(Some("error"), Some(&config));
    assert_eq!(level, "error");
}
