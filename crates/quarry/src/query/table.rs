//! FROM-clause targets.
//!
//! [`TableRef`] is the explicit tagged form of "what goes after FROM": a
//! validated identifier, a raw SQL fragment the caller vouches for, or a
//! nested sub-select. The tag travels with the value, so rendering never has
//! to guess from string shape.

use crate::adapter::Dialect;
use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use crate::query::Query;
use crate::statement::Statement;

/// A FROM-clause target.
#[derive(Debug, Clone)]
pub enum TableRef {
    /// A bare table name, quoted by the dialect when rendered.
    Name(Ident),
    /// A raw SQL fragment, emitted verbatim.
    Raw(String),
    /// A nested sub-select; requires an alias when used as a FROM target.
    Subquery(Box<Query>),
}

impl TableRef {
    /// A validated table name.
    pub fn name(name: &str) -> OrmResult<Self> {
        Ok(TableRef::Name(Ident::parse(name)?))
    }

    /// A raw FROM fragment, trusted as-is.
    pub fn raw(sql: impl Into<String>) -> Self {
        TableRef::Raw(sql.into())
    }

    /// A nested sub-select.
    pub fn subquery(query: Query) -> Self {
        TableRef::Subquery(Box::new(query))
    }

    /// The comparable name of this target, used for alias-collision checks
    /// and implicit `table.*` column lists. Sub-selects have none.
    pub(crate) fn display_name(&self) -> Option<String> {
        match self {
            TableRef::Name(ident) => Some(ident.to_sql()),
            TableRef::Raw(sql) => Some(sql.clone()),
            TableRef::Subquery(_) => None,
        }
    }

    /// Render this target with an optional alias.
    pub(crate) fn render(
        &self,
        alias: Option<&str>,
        dialect: &dyn Dialect,
    ) -> OrmResult<Statement> {
        let mut stmt = match self {
            TableRef::Name(ident) => Statement::raw(dialect.quote_identifier(&ident.to_sql())),
            TableRef::Raw(sql) => Statement::raw(sql.clone()),
            TableRef::Subquery(query) => {
                let Some(alias) = alias else {
                    return Err(OrmError::missing_table(
                        "a sub-select used as a FROM target requires an alias",
                    ));
                };
                let mut stmt = Statement::raw("(");
                stmt.append(query.render(dialect)?);
                stmt.push(&format!(") AS {alias}"));
                return Ok(stmt);
            }
        };
        if let Some(alias) = alias {
            stmt.push(&format!(" AS {alias}"));
        }
        Ok(stmt)
    }
}

impl From<&str> for TableRef {
    /// Conversion rule for plain strings: anything containing whitespace is
    /// taken as a raw fragment, a bare identifier becomes a validated name,
    /// and anything else falls back to raw.
    fn from(s: &str) -> Self {
        if s.chars().any(char::is_whitespace) {
            return TableRef::Raw(s.to_string());
        }
        match Ident::parse(s) {
            Ok(ident) => TableRef::Name(ident),
            Err(_) => TableRef::Raw(s.to_string()),
        }
    }
}

impl From<String> for TableRef {
    fn from(s: String) -> Self {
        TableRef::from(s.as_str())
    }
}

impl From<Query> for TableRef {
    fn from(query: Query) -> Self {
        TableRef::Subquery(Box::new(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::GenericDialect;

    #[test]
    fn bare_name_becomes_validated_ident() {
        assert!(matches!(TableRef::from("users"), TableRef::Name(_)));
    }

    #[test]
    fn whitespace_becomes_raw() {
        assert!(matches!(
            TableRef::from("users u, orders o"),
            TableRef::Raw(_)
        ));
    }

    #[test]
    fn render_with_alias() {
        let stmt = TableRef::from("users")
            .render(Some("u"), &GenericDialect::new())
            .unwrap();
        assert_eq!(stmt.text(), "users AS u");
    }

    #[test]
    fn subquery_without_alias_is_rejected() {
        let inner = Query::new("users");
        let err = TableRef::subquery(inner)
            .render(None, &GenericDialect::new())
            .unwrap_err();
        assert!(err.is_missing_table());
    }
}
