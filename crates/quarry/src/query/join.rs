//! JOIN clauses.

use crate::adapter::Dialect;
use crate::condition::Condition;
use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use crate::query::TableRef;
use crate::statement::Statement;

/// Join flavor keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// Plain `JOIN`.
    #[default]
    Join,
    Inner,
    Left,
    Right,
    Outer,
}

impl JoinKind {
    /// The SQL keyword for this join flavor.
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Join => "JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Outer => "OUTER JOIN",
        }
    }
}

/// The ON part of a join.
#[derive(Debug, Clone, Default)]
pub enum OnClause {
    /// No clause given; renders the tautology `1 = 1`.
    #[default]
    None,
    /// A raw fragment, emitted verbatim.
    Raw(String),
    /// A condition tree rendered with its parameters spliced in.
    Condition(Condition),
    /// The dotted-identifier shorthand: `left = right`.
    ColumnPair(Ident, Ident),
}

impl From<&str> for OnClause {
    fn from(s: &str) -> Self {
        OnClause::Raw(s.to_string())
    }
}

impl From<String> for OnClause {
    fn from(s: String) -> Self {
        OnClause::Raw(s)
    }
}

impl From<Condition> for OnClause {
    fn from(condition: Condition) -> Self {
        OnClause::Condition(condition)
    }
}

/// One JOIN clause: target table, optional alias, ON clause, join flavor.
#[derive(Debug, Clone)]
pub struct Join {
    table: TableRef,
    alias: Option<String>,
    on: OnClause,
    kind: JoinKind,
}

impl Join {
    /// Create a join.
    pub fn new(table: impl Into<TableRef>, on: impl Into<OnClause>, kind: JoinKind) -> Self {
        Self {
            table: table.into(),
            alias: None,
            on: on.into(),
            kind,
        }
    }

    /// Create a join from two `table.column` identifiers.
    ///
    /// The target table is derived from the table segment of the right-hand
    /// identifier; the ON clause becomes `left = right`.
    pub fn column_pair(left: Ident, right: Ident, kind: JoinKind) -> OrmResult<Self> {
        let table = right.table().ok_or_else(|| {
            OrmError::invalid_identifier(format!(
                "'{right}' is not a table.column pair"
            ))
        })?;
        Ok(Self {
            table: TableRef::Name(Ident::parse(table)?),
            alias: None,
            on: OnClause::ColumnPair(left, right),
            kind,
        })
    }

    /// Set the join target from a raw string, splitting off a trailing
    /// `" alias"` or `" AS alias"` suffix.
    pub fn set_table(&mut self, raw: &str) {
        let trimmed = raw.trim();
        if let Some(idx) = trimmed.rfind(' ') {
            let alias = trimmed[idx + 1..].to_string();
            let mut head = trimmed[..idx].trim_end();
            if head.to_ascii_uppercase().ends_with(" AS") {
                head = head[..head.len() - 3].trim_end();
            }
            self.table = TableRef::from(head);
            self.alias = Some(alias);
        } else {
            self.table = TableRef::from(trimmed);
            self.alias = None;
        }
    }

    /// Set the join alias.
    pub fn set_alias(&mut self, alias: impl Into<String>) {
        self.alias = Some(alias.into());
    }

    /// Replace the ON clause.
    pub fn set_on_clause(&mut self, on: impl Into<OnClause>) {
        self.on = on.into();
    }

    /// Replace the join flavor.
    pub fn set_kind(&mut self, kind: JoinKind) {
        self.kind = kind;
    }

    /// The join flavor.
    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub(crate) fn has_on_clause(&self) -> bool {
        !matches!(self.on, OnClause::None)
    }

    pub(crate) fn table(&self) -> &TableRef {
        &self.table
    }

    /// Render `KIND target [AS alias] ON clause`.
    pub fn render(&self, dialect: &dyn Dialect) -> OrmResult<Statement> {
        let mut stmt = Statement::raw(self.kind.as_sql());
        stmt.push(" ");

        match &self.table {
            TableRef::Subquery(_) => {
                // Sub-select join targets are FROM targets and need an alias.
                let alias = self.alias.as_deref().ok_or_else(|| {
                    OrmError::missing_table("a sub-select join target requires an alias")
                })?;
                stmt.append(self.table.render(Some(alias), dialect)?);
            }
            _ => {
                stmt.append(self.table.render(self.alias.as_deref(), dialect)?);
            }
        }

        stmt.push(" ON ");
        match &self.on {
            OnClause::None => stmt.push("1 = 1"),
            OnClause::Raw(sql) => stmt.push(sql),
            OnClause::ColumnPair(left, right) => {
                stmt.push(&format!("{left} = {right}"));
            }
            OnClause::Condition(condition) => match condition.to_statement(dialect)? {
                Some(inner) => stmt.append(inner),
                None => stmt.push("1 = 1"),
            },
        }
        Ok(stmt)
    }
}
