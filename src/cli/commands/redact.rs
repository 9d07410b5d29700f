//! Redact command implementation
//!
//! Loads a JSON array of records for one configured model into a
//! [`MemoryStore`], redacts every row and writes the result back out. With
//! `--sql` the equivalent set-based `UPDATE` is printed instead.

use crate::adapters::dynamic::DynamicRecord;
use crate::adapters::sql::{render_update, table_name, SqlDialect, SqlStatement};
use crate::adapters::storage::{MemoryStore, Selection};
use crate::anonymisation::{AutoRedacters, ConfiguredHandler, FieldRedacter, Handler, RedactOptions};
use crate::config::load_config;
use anyhow::Context;
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the redact command
#[derive(Args, Debug)]
pub struct RedactArgs {
    /// JSON file holding an array of records
    #[arg(short, long, required_unless_present = "sql")]
    pub input: Option<PathBuf>,

    /// Where to write the redacted records
    #[arg(short, long, required_unless_present = "sql")]
    pub output: Option<PathBuf>,

    /// Model label as declared in the configuration (app.Model)
    #[arg(short, long)]
    pub model: String,

    /// Override a field value (repeatable), e.g. --set first_name=Anon
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,

    /// Skip automatic redaction for this run
    #[arg(long)]
    pub no_auto_redact: bool,

    /// Print the UPDATE statement for this dialect (postgres, sqlite, mysql, oracle) instead of redacting
    #[arg(long, value_name = "DIALECT")]
    pub sql: Option<SqlDialect>,
}

/// Comment lines listing parameters in the dialect's placeholder style
fn param_lines(statement: &SqlStatement, dialect: SqlDialect) -> Vec<String> {
    statement
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| match dialect.placeholder(i + 1).as_str() {
            "?" => format!("-- ? #{} = {param}", i + 1),
            placeholder => format!("-- {placeholder} = {param}"),
        })
        .collect()
}

fn parse_override(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{s}'")),
    }
}

impl RedactArgs {
    /// Execute the redact command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(model = %self.model, "Starting redact command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let Some(model) = config.model(&self.model) else {
            eprintln!("❌ Model '{}' is not declared in {config_path}", self.model);
            return Ok(2);
        };

        let handler = ConfiguredHandler::from_config(model, AutoRedacters::from_config(&config.auto_redact)?)?;

        if let Some(dialect) = self.sql {
            return self.print_sql(&handler, dialect);
        }

        let Some(input) = &self.input else {
            anyhow::bail!("--input is required unless --sql is given");
        };
        let contents = fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let rows: serde_json::Value = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid JSON in {}", input.display()))?;
        let records = DynamicRecord::many_from_json(handler.shared_schema(), rows)?;

        let mut store = MemoryStore::new(handler.shared_schema().as_ref().clone());
        for record in records {
            store.insert(record)?;
        }

        let count = handler.redact_selection(&mut store, &Selection::all(), self.options())?;

        let Some(output_path) = &self.output else {
            anyhow::bail!("--output is required unless --sql is given");
        };
        let redacted: Vec<_> = store.rows().iter().map(DynamicRecord::to_json).collect();
        let output = serde_json::to_string_pretty(&redacted)?;
        fs::write(output_path, output)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        println!("✅ Redacted {count} {} record(s) into {}", self.model, output_path.display());
        Ok(0)
    }

    fn print_sql(&self, handler: &ConfiguredHandler, dialect: SqlDialect) -> anyhow::Result<i32> {
        let values = handler.resolve_redaction_values(&self.options());
        let statement = render_update(
            &table_name(&handler.record_type()),
            &Selection::all(),
            &values,
            dialect,
        )
        .with_context(|| format!("Cannot render redaction of {} for {dialect}", self.model))?;

        println!("{};", statement.sql);
        for line in param_lines(&statement, dialect) {
            println!("{line}");
        }
        Ok(0)
    }

    fn options(&self) -> RedactOptions {
        let mut options = RedactOptions::new();
        if self.no_auto_redact {
            options = options.auto_redact(false);
        }
        for (field, value) in &self.overrides {
            options = options.set(field.as_str(), value.as_str());
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;
    use serde_json::{json, Value};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const CONFIG: &str = r#"
[auto_redact]
text_length = 6

[[models]]
model = "tests.User"
exclude = ["location"]
fields = [
    { name = "id", type = "AutoField", primary_key = true },
    { name = "first_name", type = "CharField", max_length = 5 },
    { name = "location", type = "CharField", max_length = 50 },
    { name = "bio", type = "TextField" },
]
custom = { first_name = "FIRST" }
"#;

    struct Fixture {
        _dir: TempDir,
        config: NamedTempFile,
        input: PathBuf,
        output: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let mut config = NamedTempFile::new().unwrap();
        config.write_all(CONFIG.as_bytes()).unwrap();
        config.flush().unwrap();

        let input = dir.path().join("rows.json");
        let rows = json!([
            {"id": 1, "first_name": "fred", "location": "Bedrock", "bio": "Quarry worker"},
            {"id": 2, "first_name": "wilma", "location": "Bedrock", "bio": "Reporter"},
        ]);
        fs::write(&input, rows.to_string()).unwrap();

        let output = dir.path().join("out.json");
        Fixture { _dir: dir, config, input, output }
    }

    fn args(fixture: &Fixture, model: &str) -> RedactArgs {
        RedactArgs {
            input: Some(fixture.input.clone()),
            output: Some(fixture.output.clone()),
            model: model.to_string(),
            overrides: Vec::new(),
            no_auto_redact: false,
            sql: None,
        }
    }

    fn read_output(fixture: &Fixture) -> Vec<Value> {
        serde_json::from_str(&fs::read_to_string(&fixture.output).unwrap()).unwrap()
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("location=Mars").unwrap(),
            ("location".to_string(), "Mars".to_string())
        );
        assert_eq!(parse_override("bio=").unwrap(), ("bio".to_string(), String::new()));
        assert!(parse_override("location").is_err());
        assert!(parse_override("=Mars").is_err());
    }

    #[test]
    fn test_redacts_all_rows() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let fixture = fixture();
        let code = args(&fixture, "tests.User")
            .execute(fixture.config.path().to_str().unwrap())
            .unwrap();
        assert_eq!(code, 0);

        let rows = read_output(&fixture);
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row["first_name"], "FIRST");
            assert_eq!(row["location"], "Bedrock");
            assert_eq!(row["bio"], "XXXXXX");
        }
        assert_eq!(rows[1]["id"], 2);
    }

    #[test]
    fn test_overrides_and_no_auto_redact() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let fixture = fixture();
        let mut args = args(&fixture, "tests.User");
        args.overrides = vec![("location".to_string(), "Mars".to_string())];
        args.no_auto_redact = true;

        assert_eq!(args.execute(fixture.config.path().to_str().unwrap()).unwrap(), 0);

        let rows = read_output(&fixture);
        assert_eq!(rows[0]["location"], "Mars");
        assert_eq!(rows[0]["first_name"], "FIRST");
        assert_eq!(rows[0]["bio"], "Quarry worker");
    }

    #[test]
    fn test_print_sql_leaves_no_output() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let fixture = fixture();
        let mut args = args(&fixture, "tests.User");
        args.output = None;
        args.sql = Some(SqlDialect::Postgres);

        assert_eq!(args.execute(fixture.config.path().to_str().unwrap()).unwrap(), 0);
        assert!(!fixture.output.exists());
    }

    #[test]
    fn test_print_sql_with_literal_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let fixture = fixture();
        let mut args = args(&fixture, "tests.User");
        args.overrides = vec![("location".to_string(), "Mars".to_string())];
        args.sql = Some(SqlDialect::MySql);

        assert_eq!(args.execute(fixture.config.path().to_str().unwrap()).unwrap(), 0);
    }

    #[test]
    fn test_print_sql_without_input() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let fixture = fixture();
        let mut args = args(&fixture, "tests.User");
        args.input = None;
        args.output = None;
        args.sql = Some(SqlDialect::Oracle);

        assert_eq!(args.execute(fixture.config.path().to_str().unwrap()).unwrap(), 0);
    }

    #[test]
    fn test_redact_requires_input_without_sql() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let fixture = fixture();
        let mut args = args(&fixture, "tests.User");
        args.input = None;

        assert!(args.execute(fixture.config.path().to_str().unwrap()).is_err());
        assert!(!fixture.output.exists());
    }

    #[test]
    fn test_param_lines_follow_dialect() {
        let statement = SqlStatement {
            sql: String::new(),
            params: vec!["FIRST".into(), "Mars".into()],
        };
        assert_eq!(
            param_lines(&statement, SqlDialect::Postgres),
            vec!["-- $1 = FIRST", "-- $2 = Mars"]
        );
        assert_eq!(
            param_lines(&statement, SqlDialect::Oracle),
            vec!["-- :1 = FIRST", "-- :2 = Mars"]
        );
        assert_eq!(
            param_lines(&statement, SqlDialect::MySql),
            vec!["-- ? #1 = FIRST", "-- ? #2 = Mars"]
        );
        assert_eq!(
            param_lines(&statement, SqlDialect::Sqlite),
            vec!["-- ? #1 = FIRST", "-- ? #2 = Mars"]
        );
    }

    #[test]
    fn test_unknown_model() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let fixture = fixture();
        let code = args(&fixture, "tests.Missing")
            .execute(fixture.config.path().to_str().unwrap())
            .unwrap();
        assert_eq!(code, 2);
        assert!(!fixture.output.exists());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let fixture = fixture();
        fs::write(&fixture.input, json!([{"id": 1, "nickname": "freddy"}]).to_string()).unwrap();

        let result = args(&fixture, "tests.User").execute(fixture.config.path().to_str().unwrap());
        assert!(result.is_err());
    }
}
