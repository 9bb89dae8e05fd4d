//! Adapter traits for dialect rendering and statement execution.
//!
//! The builder core never talks to a database directly. Everything
//! dialect-specific goes through [`Dialect`] (identifier quoting, limit
//! clauses, literal rendering), and everything transport-specific goes
//! through [`Adapter`] (statement execution, insert ids). This keeps SQL
//! backends, REST backends, and test doubles behind the same seam.

use crate::error::OrmResult;
use crate::value::Value;
use std::collections::BTreeMap;

/// A result row: column name to value.
pub type Row = BTreeMap<String, Value>;

/// Outcome of executing one statement.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Result rows, in cursor order.
    pub rows: Vec<Row>,
    /// Rows affected by a mutating statement.
    pub rows_affected: u64,
}

/// Dialect hooks consumed while rendering queries.
pub trait Dialect {
    /// Quote an identifier for this dialect.
    ///
    /// Dotted identifiers are quoted per segment.
    fn quote_identifier(&self, name: &str) -> String;

    /// Append this dialect's limit/offset clause to a finished statement.
    fn apply_limit(&self, sql: &str, offset: i64, limit: i64) -> String;

    /// Render a bound value as a SQL literal.
    ///
    /// Used when substituting placeholders for display or naive execution:
    /// booleans become 0/1, NULL stays `NULL`, dates render as ISO date or
    /// datetime strings depending on whether a time-of-day component is
    /// present, and text is single-quoted with `'` doubled.
    fn prepare_input(&self, value: &Value) -> String;
}

/// A storage backend that can execute rendered statements.
pub trait Adapter: Dialect {
    /// Execute a statement with its bound parameters.
    ///
    /// Transport and database errors are surfaced verbatim as
    /// [`OrmError::Adapter`](crate::OrmError::Adapter); the core neither
    /// wraps nor retries them.
    fn execute(&mut self, sql: &str, params: &[Value]) -> OrmResult<ExecResult>;

    /// The id generated by the most recent INSERT, if the backend tracks one.
    fn last_insert_id(&self) -> Option<Value>;
}

/// Configurable ANSI-flavored dialect.
///
/// This is the default dialect for rendering and the dialect used by tests.
/// Identifiers are quoted only when a segment is not a plain identifier, so
/// common lowercase names pass through untouched.
#[derive(Debug, Clone)]
pub struct GenericDialect {
    /// Identifier quote character.
    pub quote_char: char,
    /// Emit `OFFSET n` after `LIMIT n` when the offset is non-zero.
    pub emit_offset: bool,
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self {
            quote_char: '"',
            emit_offset: true,
        }
    }
}

impl GenericDialect {
    /// Create a dialect with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    fn needs_quoting(segment: &str) -> bool {
        let mut chars = segment.chars();
        match chars.next() {
            Some(c) if c == '_' || c.is_ascii_lowercase() => {}
            _ => return true,
        }
        chars.any(|c| c != '_' && !c.is_ascii_lowercase() && !c.is_ascii_digit())
    }
}

impl Dialect for GenericDialect {
    fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|segment| {
                if Self::needs_quoting(segment) {
                    let q = self.quote_char;
                    let doubled = segment.replace(q, &format!("{q}{q}"));
                    format!("{q}{doubled}{q}")
                } else {
                    segment.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn apply_limit(&self, sql: &str, offset: i64, limit: i64) -> String {
        let mut out = format!("{sql} LIMIT {limit}");
        if self.emit_offset && offset > 0 {
            out.push_str(&format!(" OFFSET {offset}"));
        }
        out
    }

    fn prepare_input(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => quote_literal(s),
            Value::Date(d) => quote_literal(&d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => {
                // A midnight timestamp renders as a bare date.
                let formatted = if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                };
                quote_literal(&formatted)
            }
            Value::Json(j) => quote_literal(&j.to_string()),
        }
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    #[test]
    fn quote_identifier_passes_plain_names() {
        let d = GenericDialect::new();
        assert_eq!(d.quote_identifier("users"), "users");
        assert_eq!(d.quote_identifier("order_items"), "order_items");
    }

    #[test]
    fn quote_identifier_quotes_mixed_case() {
        let d = GenericDialect::new();
        assert_eq!(d.quote_identifier("UserTable"), "\"UserTable\"");
    }

    #[test]
    fn quote_identifier_quotes_per_segment() {
        let d = GenericDialect::new();
        assert_eq!(d.quote_identifier("public.UserTable"), "public.\"UserTable\"");
    }

    #[test]
    fn apply_limit_with_offset() {
        let d = GenericDialect::new();
        assert_eq!(
            d.apply_limit("SELECT 1", 20, 10),
            "SELECT 1 LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn apply_limit_zero_offset_omitted() {
        let d = GenericDialect::new();
        assert_eq!(d.apply_limit("SELECT 1", 0, 10), "SELECT 1 LIMIT 10");
    }

    #[test]
    fn prepare_input_bool() {
        let d = GenericDialect::new();
        assert_eq!(d.prepare_input(&Value::Bool(true)), "1");
        assert_eq!(d.prepare_input(&Value::Bool(false)), "0");
    }

    #[test]
    fn prepare_input_text_doubles_quotes() {
        let d = GenericDialect::new();
        assert_eq!(
            d.prepare_input(&Value::Text("O'Brien".to_string())),
            "'O''Brien'"
        );
    }

    #[test]
    fn prepare_input_midnight_datetime_is_date_only() {
        let d = GenericDialect::new();
        let midnight: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(d.prepare_input(&Value::DateTime(midnight)), "'2024-03-07'");

        let afternoon = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(13, 5, 9)
            .unwrap();
        assert_eq!(
            d.prepare_input(&Value::DateTime(afternoon)),
            "'2024-03-07 13:05:09'"
        );
    }
}
