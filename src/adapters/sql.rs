//! SQL rendering for set-based redaction updates
//!
//! Renders the single `UPDATE` statement a relational backend would run for
//! a redaction map, so that expressions such as [`Expression::GenerateUuid4`]
//! are evaluated by the database once per row.

use super::storage::{Condition, Selection};
use crate::domain::{Expression, FieldValue, RecordType, RedactionValue, RedactionValues, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    Postgres,
    Sqlite,
    MySql,
    Oracle,
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Postgres => "postgresql",
            Self::Sqlite => "sqlite",
            Self::MySql => "mysql",
            Self::Oracle => "oracle",
        };
        f.write_str(name)
    }
}

impl SqlDialect {
    /// Placeholder for the 1-based parameter `position`
    pub fn placeholder(self, position: usize) -> String {
        match self {
            Self::Postgres => format!("${position}"),
            Self::Oracle => format!(":{position}"),
            Self::Sqlite | Self::MySql => "?".to_string(),
        }
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            "mysql" => Ok(Self::MySql),
            "oracle" => Ok(Self::Oracle),
            _ => Err(format!(
                "Unknown SQL dialect '{s}'. Must be one of: postgres, sqlite, mysql, oracle"
            )),
        }
    }
}

/// Rendered statement with positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<FieldValue>,
}

/// Default table name for a record type (`app_label_modelname`)
pub fn table_name(record_type: &RecordType) -> String {
    format!(
        "{}_{}",
        record_type.app_label(),
        record_type.model_name().to_lowercase()
    )
}

struct Renderer {
    dialect: SqlDialect,
    params: Vec<FieldValue>,
}

impl Renderer {
    fn ident(&self, name: &str) -> String {
        match self.dialect {
            SqlDialect::MySql => format!("`{}`", name.replace('`', "``")),
            _ => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    fn param(&mut self, value: FieldValue) -> String {
        self.params.push(value);
        self.dialect.placeholder(self.params.len())
    }

    fn value(&mut self, value: &RedactionValue) -> Result<String, StorageError> {
        match value {
            RedactionValue::Literal(FieldValue::Null) => Ok("NULL".to_string()),
            RedactionValue::Literal(v) => Ok(self.param(v.clone())),
            RedactionValue::Expression(expr) => self.expression(expr),
        }
    }

    fn expression(&mut self, expr: &Expression) -> Result<String, StorageError> {
        match expr {
            Expression::GenerateUuid4 => match self.dialect {
                SqlDialect::Postgres => Ok("gen_random_uuid()".to_string()),
                SqlDialect::Sqlite => Ok("HEX(RANDOMBLOB(16))".to_string()),
                other => Err(StorageError::Unsupported(format!(
                    "{other} does not support native generation of UUIDs"
                ))),
            },
            Expression::Field(name) => Ok(self.ident(name)),
            Expression::Concat(parts) => {
                let rendered = parts
                    .iter()
                    .map(|p| self.value(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match self.dialect {
                    SqlDialect::MySql => format!("CONCAT({})", rendered.join(", ")),
                    _ => format!("({})", rendered.join(" || ")),
                })
            }
        }
    }

    fn condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Eq(field, FieldValue::Null) => format!("{} IS NULL", self.ident(field)),
            Condition::Eq(field, value) => {
                let column = self.ident(field);
                format!("{column} = {}", self.param(value.clone()))
            }
            Condition::In(_, values) if values.is_empty() => "1 = 0".to_string(),
            Condition::In(field, values) => {
                let column = self.ident(field);
                let placeholders: Vec<_> = values.iter().map(|v| self.param(v.clone())).collect();
                format!("{column} IN ({})", placeholders.join(", "))
            }
        }
    }
}

/// Render `UPDATE table SET ... [WHERE ...]`
///
/// # Errors
///
/// Returns [`StorageError::Unsupported`] if the dialect cannot express one of
/// the expressions, or [`StorageError::Backend`] for an empty value map.
///
/// # Examples
///
/// ```
/// use anonymiser::adapters::sql::{render_update, SqlDialect};
/// use anonymiser::adapters::storage::Selection;
/// use anonymiser::domain::{Expression, RedactionValues};
///
/// let values = RedactionValues::new().with("uuid", Expression::GenerateUuid4);
/// let stmt = render_update("tests_user", &Selection::all(), &values, SqlDialect::Postgres).unwrap();
/// assert_eq!(stmt.sql, r#"UPDATE "tests_user" SET "uuid" = gen_random_uuid()"#);
/// ```
pub fn render_update(
    table: &str,
    selection: &Selection,
    values: &RedactionValues,
    dialect: SqlDialect,
) -> Result<SqlStatement, StorageError> {
    if values.is_empty() {
        return Err(StorageError::Backend(
            "cannot render an UPDATE without values".to_string(),
        ));
    }

    let mut renderer = Renderer {
        dialect,
        params: Vec::new(),
    };

    let mut assignments = Vec::with_capacity(values.len());
    for (field, value) in values {
        let column = renderer.ident(field);
        assignments.push(format!("{column} = {}", renderer.value(value)?));
    }

    let mut sql = format!(
        "UPDATE {} SET {}",
        renderer.ident(table),
        assignments.join(", ")
    );

    match selection {
        Selection::All => {}
        Selection::None => sql.push_str(" WHERE 1 = 0"),
        Selection::Filter(conditions) if conditions.is_empty() => {}
        Selection::Filter(conditions) => {
            let clauses: Vec<_> = conditions.iter().map(|c| renderer.condition(c)).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
    }

    Ok(SqlStatement {
        sql,
        params: renderer.params,
    })
}
