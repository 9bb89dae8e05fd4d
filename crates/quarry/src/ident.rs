//! Validated SQL identifiers.
//!
//! [`Ident`] represents a dotted SQL identifier (`table`, `schema.table`,
//! `table.column`). Parts are validated against `[A-Za-z_][A-Za-z0-9_]*`;
//! dialect-specific quoting happens at the adapter boundary, not here.
//!
//! Two-part idents double as column references: the join shorthand
//! (`orders.customer_id` / `customers.id`) is detected through
//! [`Ident::is_column_pair`].

use crate::error::{OrmError, OrmResult};

/// A dotted SQL identifier (table, column, or `table.column` reference).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Parse a dotted identifier string.
    ///
    /// Each part must start with a letter or underscore and continue with
    /// letters, digits, or underscores. Empty parts (leading, trailing, or
    /// doubled dots) are rejected.
    pub fn parse(s: &str) -> OrmResult<Self> {
        if s.is_empty() {
            return Err(OrmError::invalid_identifier("identifier cannot be empty"));
        }

        let mut parts = Vec::new();
        for part in s.split('.') {
            if part.is_empty() {
                return Err(OrmError::invalid_identifier(format!(
                    "empty segment in identifier '{s}'"
                )));
            }
            let mut chars = part.chars();
            let first = chars.next().expect("segment is non-empty");
            if first != '_' && !first.is_ascii_alphabetic() {
                return Err(OrmError::invalid_identifier(format!(
                    "segment '{part}' must start with a letter or underscore"
                )));
            }
            if let Some(bad) = chars.find(|c| *c != '_' && !c.is_ascii_alphanumeric()) {
                return Err(OrmError::invalid_identifier(format!(
                    "invalid character '{bad}' in segment '{part}'"
                )));
            }
            parts.push(part.to_string());
        }

        Ok(Self { parts })
    }

    /// The identifier segments, outermost first.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// True when this is exactly a `table.column` pair.
    pub fn is_column_pair(&self) -> bool {
        self.parts.len() == 2
    }

    /// The table segment of a `table.column` pair.
    pub fn table(&self) -> Option<&str> {
        if self.is_column_pair() {
            Some(&self.parts[0])
        } else {
            None
        }
    }

    /// The column segment of a `table.column` pair.
    pub fn column(&self) -> Option<&str> {
        if self.is_column_pair() {
            Some(&self.parts[1])
        } else {
            None
        }
    }

    /// Render the dotted, unquoted form.
    pub fn to_sql(&self) -> String {
        self.parts.join(".")
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("users").unwrap();
        assert_eq!(ident.to_sql(), "users");
        assert!(!ident.is_column_pair());
    }

    #[test]
    fn ident_column_pair() {
        let ident = Ident::parse("orders.customer_id").unwrap();
        assert!(ident.is_column_pair());
        assert_eq!(ident.table(), Some("orders"));
        assert_eq!(ident.column(), Some("customer_id"));
    }

    #[test]
    fn ident_three_parts_is_not_a_pair() {
        let ident = Ident::parse("db.schema.table").unwrap();
        assert!(!ident.is_column_pair());
        assert_eq!(ident.to_sql(), "db.schema.table");
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::parse("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(Ident::parse("1table").is_err());
    }

    #[test]
    fn ident_rejects_space() {
        assert!(Ident::parse("my table").is_err());
    }

    #[test]
    fn ident_rejects_double_dot() {
        assert!(Ident::parse("schema..table").is_err());
    }

    #[test]
    fn ident_rejects_trailing_dot() {
        assert!(Ident::parse("schema.").is_err());
    }
}
