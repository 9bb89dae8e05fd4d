//! SELECT/COUNT/DELETE statement builder.
//!
//! A [`Query`] owns a table target, joins, a WHERE [`Condition`], grouping,
//! having, ordering, and limits, and renders the whole tree into one
//! [`Statement`] whose parameters are ordered exactly as their placeholders
//! appear in the final SQL text.
//!
//! # Usage
//!
//! ```ignore
//! use quarry::{GenericDialect, Query};
//!
//! let dialect = GenericDialect::new();
//! let stmt = Query::new("users")
//!     .and_eq("active", true)
//!     .and_greater("age", 18)
//!     .order_by_dir("name", "ASC")?
//!     .set_limit_offset(10, 20)?
//!     .get_select_query(&dialect)?;
//! ```

mod export;
mod join;
mod table;

pub use export::{ExportFilter, ExportOrder, QueryExport};
pub use join::{Join, JoinKind, OnClause};
pub use table::TableRef;

use crate::adapter::Dialect;
use crate::condition::{Condition, Operator, QuoteMode};
use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use crate::statement::Statement;
use crate::value::Value;
use tracing::debug;

/// What the rendered statement does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Select,
    Count,
    Delete,
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction, case-insensitively.
    pub fn parse(s: &str) -> OrmResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(OrmError::InvalidSortDirection(s.to_string())),
        }
    }

    /// The SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A SELECT/COUNT/DELETE query under construction.
#[derive(Debug, Clone, Default)]
pub struct Query {
    action: Action,
    table: Option<TableRef>,
    table_alias: Option<String>,
    extra_tables: Vec<(Option<String>, TableRef)>,
    columns: Vec<String>,
    joins: Vec<Join>,
    where_clause: Condition,
    group_by: Vec<String>,
    having: Option<Condition>,
    order_by: Vec<(String, Option<SortDirection>)>,
    limit: Option<i64>,
    offset: i64,
    distinct: bool,
}

impl Query {
    /// Create a query over a table.
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    /// Create a query with no table; one must be set before rendering.
    pub fn empty() -> Self {
        Self::default()
    }

    // ==================== Tables ====================

    /// Set the primary table and its alias.
    pub fn set_table(mut self, table: impl Into<TableRef>, alias: Option<&str>) -> Self {
        self.table = Some(table.into());
        self.table_alias = alias.map(str::to_string);
        self
    }

    /// Add an extra non-joined table, comma-separated in FROM.
    ///
    /// The alias (or the table name when no alias is given) must not collide
    /// with the primary table, its alias, or a previously added table.
    pub fn add_table(mut self, table: impl Into<TableRef>, alias: Option<&str>) -> OrmResult<Self> {
        let table = table.into();
        let effective = match alias {
            Some(a) => a.to_string(),
            None => table.display_name().ok_or_else(|| {
                OrmError::missing_table("a sub-select used as a FROM target requires an alias")
            })?,
        };

        let mut taken: Vec<String> = Vec::new();
        if let Some(primary) = self.table.as_ref().and_then(TableRef::display_name) {
            taken.push(primary);
        }
        if let Some(primary_alias) = &self.table_alias {
            taken.push(primary_alias.clone());
        }
        for (extra_alias, extra) in &self.extra_tables {
            match extra_alias {
                Some(a) => taken.push(a.clone()),
                None => taken.extend(extra.display_name()),
            }
        }
        if taken.contains(&effective) {
            return Err(OrmError::DuplicateAlias(effective));
        }

        self.extra_tables
            .push((alias.map(str::to_string), table));
        Ok(self)
    }

    // ==================== Columns ====================

    /// Append one selected column or expression.
    pub fn add_column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Replace the selected column list.
    pub fn set_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    // ==================== Grouping, having, ordering ====================

    /// Append a GROUP BY column.
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Set the HAVING condition.
    pub fn set_having(mut self, having: Condition) -> Self {
        self.having = Some(having);
        self
    }

    /// Append an ORDER BY column with no explicit direction.
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push((column.into(), None));
        self
    }

    /// Append an ORDER BY column with a direction (`ASC`/`DESC`,
    /// case-insensitive).
    pub fn order_by_dir(mut self, column: impl Into<String>, direction: &str) -> OrmResult<Self> {
        let direction = SortDirection::parse(direction)?;
        self.order_by.push((column.into(), Some(direction)));
        Ok(self)
    }

    // ==================== Limits ====================

    /// Set the row limit.
    pub fn set_limit(self, limit: i64) -> OrmResult<Self> {
        self.set_limit_offset(limit, 0)
    }

    /// Set the row limit and offset.
    pub fn set_limit_offset(mut self, limit: i64, offset: i64) -> OrmResult<Self> {
        if limit < 0 {
            return Err(OrmError::invalid_argument(format!(
                "limit must be >= 0, got {limit}"
            )));
        }
        self.limit = Some(limit);
        self.set_offset(offset)
    }

    /// Set the row offset.
    pub fn set_offset(mut self, offset: i64) -> OrmResult<Self> {
        if offset < 0 {
            return Err(OrmError::invalid_argument(format!(
                "offset must be >= 0, got {offset}"
            )));
        }
        self.offset = offset;
        Ok(self)
    }

    /// Pagination helper; `page` is 1-based.
    pub fn paginate(self, page: i64, per_page: i64) -> OrmResult<Self> {
        if page < 1 {
            return Err(OrmError::invalid_argument(format!(
                "page must be >= 1, got {page}"
            )));
        }
        if per_page < 1 {
            return Err(OrmError::invalid_argument(format!(
                "per_page must be >= 1, got {per_page}"
            )));
        }
        self.set_limit_offset(per_page, (page - 1) * per_page)
    }

    /// Toggle SELECT DISTINCT.
    pub fn set_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Set the action rendered by [`render`](Self::render).
    pub fn set_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// The current action.
    pub fn action(&self) -> Action {
        self.action
    }

    /// The configured row limit.
    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    /// The configured row offset.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    // ==================== Joins ====================

    /// Add a plain JOIN.
    ///
    /// When both arguments are `table.column` identifiers, the shorthand is
    /// detected: the join target becomes the table of the second identifier
    /// and the ON clause becomes `left = right`. Otherwise the first
    /// argument is the join target and the second a raw ON fragment.
    pub fn add_join(self, table: &str, on: &str) -> Self {
        self.join_shorthand(table, on, JoinKind::Join)
    }

    /// Add an INNER JOIN, shorthand-aware like [`add_join`](Self::add_join).
    pub fn inner_join(self, table: &str, on: &str) -> Self {
        self.join_shorthand(table, on, JoinKind::Inner)
    }

    /// Add a LEFT JOIN, shorthand-aware like [`add_join`](Self::add_join).
    pub fn left_join(self, table: &str, on: &str) -> Self {
        self.join_shorthand(table, on, JoinKind::Left)
    }

    /// Add a RIGHT JOIN, shorthand-aware like [`add_join`](Self::add_join).
    pub fn right_join(self, table: &str, on: &str) -> Self {
        self.join_shorthand(table, on, JoinKind::Right)
    }

    /// Add an OUTER JOIN, shorthand-aware like [`add_join`](Self::add_join).
    pub fn outer_join(self, table: &str, on: &str) -> Self {
        self.join_shorthand(table, on, JoinKind::Outer)
    }

    fn join_shorthand(mut self, table: &str, on: &str, kind: JoinKind) -> Self {
        let pair = match (Ident::parse(table), Ident::parse(on)) {
            (Ok(left), Ok(right)) if left.is_column_pair() && right.is_column_pair() => {
                Join::column_pair(left, right, kind).ok()
            }
            _ => None,
        };
        let join = pair.unwrap_or_else(|| Join::new(table, on, kind));
        self.joins.push(join);
        self
    }

    /// Add a join with an explicit ON clause and flavor.
    ///
    /// An explicitly absent ON clause with a plain or inner flavor degrades
    /// to a comma join ([`add_table`](Self::add_table)); any other flavor
    /// keeps the JOIN keyword and renders `1 = 1`.
    pub fn add_join_on(
        mut self,
        table: impl Into<TableRef>,
        on: impl Into<OnClause>,
        kind: JoinKind,
    ) -> OrmResult<Self> {
        let join = Join::new(table, on, kind);
        if !join.has_on_clause() && matches!(kind, JoinKind::Join | JoinKind::Inner) {
            let table = join.table().clone();
            return self.add_table(table, None);
        }
        self.joins.push(join);
        Ok(self)
    }

    /// Add a pre-built [`Join`].
    pub fn add_join_object(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    // ==================== WHERE delegation ====================

    /// AND a nested condition into WHERE.
    pub fn and(mut self, nested: Condition) -> Self {
        self.where_clause = self.where_clause.and(nested);
        self
    }

    /// OR a nested condition into WHERE.
    pub fn or(mut self, nested: Condition) -> Self {
        self.where_clause = self.where_clause.or(nested);
        self
    }

    /// AND a pre-built statement fragment into WHERE.
    pub fn and_statement(mut self, statement: Statement) -> Self {
        self.where_clause = self.where_clause.and_statement(statement);
        self
    }

    /// OR a pre-built statement fragment into WHERE.
    pub fn or_statement(mut self, statement: Statement) -> Self {
        self.where_clause = self.where_clause.or_statement(statement);
        self
    }

    /// Add WHERE: `column = value`.
    pub fn and_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_eq(column, value);
        self
    }

    /// Add WHERE (OR): `column = value`.
    pub fn or_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_eq(column, value);
        self
    }

    /// Add WHERE: `column <operator> value`.
    pub fn and_cmp(
        mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.where_clause = self.where_clause.and_cmp(column, operator, value);
        self
    }

    /// Add WHERE (OR): `column <operator> value`.
    pub fn or_cmp(
        mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.where_clause = self.where_clause.or_cmp(column, operator, value);
        self
    }

    /// Add WHERE: `column <operator> value` with an explicit quote mode.
    pub fn and_cmp_mode(
        mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
        quote: QuoteMode,
    ) -> Self {
        self.where_clause = self.where_clause.and_cmp_mode(column, operator, value, quote);
        self
    }

    /// Add WHERE (OR): `column <operator> value` with an explicit quote mode.
    pub fn or_cmp_mode(
        mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
        quote: QuoteMode,
    ) -> Self {
        self.where_clause = self.where_clause.or_cmp_mode(column, operator, value, quote);
        self
    }

    /// Add WHERE: column-to-column comparison, nothing bound.
    pub fn and_columns(
        mut self,
        left: impl Into<String>,
        operator: Operator,
        right: impl Into<String>,
    ) -> Self {
        self.where_clause = self.where_clause.and_columns(left, operator, right);
        self
    }

    /// Add WHERE (OR): column-to-column comparison, nothing bound.
    pub fn or_columns(
        mut self,
        left: impl Into<String>,
        operator: Operator,
        right: impl Into<String>,
    ) -> Self {
        self.where_clause = self.where_clause.or_columns(left, operator, right);
        self
    }

    /// Add WHERE: one `column = value` clause per entry.
    pub fn and_map<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.where_clause = self.where_clause.and_map(pairs);
        self
    }

    /// Add WHERE (OR): one `column = value` clause per entry.
    pub fn or_map<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.where_clause = self.where_clause.or_map(pairs);
        self
    }

    /// Add WHERE: `column IN (values...)`.
    pub fn and_in<T: Into<Value>>(mut self, column: impl Into<String>, values: Vec<T>) -> Self {
        self.where_clause = self.where_clause.and_in(column, values);
        self
    }

    /// Add WHERE (OR): `column IN (values...)`.
    pub fn or_in<T: Into<Value>>(mut self, column: impl Into<String>, values: Vec<T>) -> Self {
        self.where_clause = self.where_clause.or_in(column, values);
        self
    }

    /// Add WHERE: `column NOT IN (values...)`.
    pub fn and_not_in<T: Into<Value>>(mut self, column: impl Into<String>, values: Vec<T>) -> Self {
        self.where_clause = self.where_clause.and_not_in(column, values);
        self
    }

    /// Add WHERE (OR): `column NOT IN (values...)`.
    pub fn or_not_in<T: Into<Value>>(mut self, column: impl Into<String>, values: Vec<T>) -> Self {
        self.where_clause = self.where_clause.or_not_in(column, values);
        self
    }

    /// Add WHERE: `column <operator> (subquery)`.
    pub fn and_subquery(
        mut self,
        column: impl Into<String>,
        operator: Operator,
        subquery: Query,
    ) -> Self {
        self.where_clause = self.where_clause.and_subquery(column, operator, subquery);
        self
    }

    /// Add WHERE (OR): `column <operator> (subquery)`.
    pub fn or_subquery(
        mut self,
        column: impl Into<String>,
        operator: Operator,
        subquery: Query,
    ) -> Self {
        self.where_clause = self.where_clause.or_subquery(column, operator, subquery);
        self
    }

    /// Add WHERE: `column != value`.
    pub fn and_not(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_not(column, value);
        self
    }

    /// Add WHERE (OR): `column != value`.
    pub fn or_not(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_not(column, value);
        self
    }

    /// Add WHERE: `column LIKE pattern`.
    pub fn and_like(mut self, column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_like(column, pattern);
        self
    }

    /// Add WHERE (OR): `column LIKE pattern`.
    pub fn or_like(mut self, column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_like(column, pattern);
        self
    }

    /// Add WHERE: `column NOT LIKE pattern`.
    pub fn and_not_like(mut self, column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_not_like(column, pattern);
        self
    }

    /// Add WHERE (OR): `column NOT LIKE pattern`.
    pub fn or_not_like(mut self, column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_not_like(column, pattern);
        self
    }

    /// Add WHERE: `column > value`.
    pub fn and_greater(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_greater(column, value);
        self
    }

    /// Add WHERE (OR): `column > value`.
    pub fn or_greater(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_greater(column, value);
        self
    }

    /// Add WHERE: `column >= value`.
    pub fn and_greater_equal(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_greater_equal(column, value);
        self
    }

    /// Add WHERE (OR): `column >= value`.
    pub fn or_greater_equal(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_greater_equal(column, value);
        self
    }

    /// Add WHERE: `column < value`.
    pub fn and_less(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_less(column, value);
        self
    }

    /// Add WHERE (OR): `column < value`.
    pub fn or_less(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_less(column, value);
        self
    }

    /// Add WHERE: `column <= value`.
    pub fn and_less_equal(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_less_equal(column, value);
        self
    }

    /// Add WHERE (OR): `column <= value`.
    pub fn or_less_equal(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_less_equal(column, value);
        self
    }

    /// Add WHERE: `column IS NULL`.
    pub fn and_null(mut self, column: impl Into<String>) -> Self {
        self.where_clause = self.where_clause.and_null(column);
        self
    }

    /// Add WHERE (OR): `column IS NULL`.
    pub fn or_null(mut self, column: impl Into<String>) -> Self {
        self.where_clause = self.where_clause.or_null(column);
        self
    }

    /// Add WHERE: `column IS NOT NULL`.
    pub fn and_not_null(mut self, column: impl Into<String>) -> Self {
        self.where_clause = self.where_clause.and_not_null(column);
        self
    }

    /// Add WHERE (OR): `column IS NOT NULL`.
    pub fn or_not_null(mut self, column: impl Into<String>) -> Self {
        self.where_clause = self.where_clause.or_not_null(column);
        self
    }

    /// Add WHERE: `column BETWEEN from AND to`.
    pub fn and_between(
        mut self,
        column: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        self.where_clause = self.where_clause.and_between(column, from, to);
        self
    }

    /// Add WHERE (OR): `column BETWEEN from AND to`.
    pub fn or_between(
        mut self,
        column: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        self.where_clause = self.where_clause.or_between(column, from, to);
        self
    }

    /// Add WHERE: `column LIKE 'value%'`.
    pub fn and_begins_with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_begins_with(column, value);
        self
    }

    /// Add WHERE (OR): `column LIKE 'value%'`.
    pub fn or_begins_with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_begins_with(column, value);
        self
    }

    /// Add WHERE: `column LIKE '%value'`.
    pub fn and_ends_with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_ends_with(column, value);
        self
    }

    /// Add WHERE (OR): `column LIKE '%value'`.
    pub fn or_ends_with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_ends_with(column, value);
        self
    }

    /// Add WHERE: `column LIKE '%value%'`.
    pub fn and_contains(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.and_contains(column, value);
        self
    }

    /// Add WHERE (OR): `column LIKE '%value%'`.
    pub fn or_contains(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause = self.where_clause.or_contains(column, value);
        self
    }

    // ==================== Aggregation predicates ====================

    /// True when the query groups, or any selected expression contains a
    /// function call.
    pub fn has_aggregates(&self) -> bool {
        !self.group_by.is_empty() || self.columns.iter().any(|c| c.contains('('))
    }

    /// True when a COUNT cannot simply wrap the base query in `count(0)`
    /// because grouping, having, or distinct would change row semantics.
    pub fn needs_complex_count(&self) -> bool {
        self.has_aggregates() || self.having.is_some() || self.distinct
    }

    // ==================== Rendering ====================

    /// Force the SELECT action and render.
    pub fn get_select_query(&mut self, dialect: &dyn Dialect) -> OrmResult<Statement> {
        self.action = Action::Select;
        self.render(dialect)
    }

    /// Force the COUNT action and render.
    pub fn get_count_query(&mut self, dialect: &dyn Dialect) -> OrmResult<Statement> {
        self.action = Action::Count;
        self.render(dialect)
    }

    /// Force the DELETE action and render.
    pub fn get_delete_query(&mut self, dialect: &dyn Dialect) -> OrmResult<Statement> {
        self.action = Action::Delete;
        self.render(dialect)
    }

    /// Render the query for its current action.
    ///
    /// Rendering is read-only and idempotent: calling it twice yields the
    /// same statement.
    pub fn render(&self, dialect: &dyn Dialect) -> OrmResult<Statement> {
        if self.table.is_none() {
            return Err(OrmError::missing_table("query has no table set"));
        }

        let mut stmt = Statement::empty();
        match self.action {
            Action::Delete => stmt.push("DELETE FROM "),
            Action::Select | Action::Count => {
                stmt.push("SELECT ");
                // DISTINCT survives into the COUNT's inner query so the
                // wrapper counts distinct rows.
                if self.distinct {
                    stmt.push("DISTINCT ");
                }
                stmt.push(&self.columns_clause());
                stmt.push(" FROM ");
            }
        }

        stmt.append(self.tables_clause(dialect)?);

        for join in &self.joins {
            stmt.push(" ");
            stmt.append(join.render(dialect)?);
        }

        if let Some(where_stmt) = self.where_clause.to_statement(dialect)? {
            stmt.push(" WHERE ");
            stmt.append(where_stmt);
        }

        if !self.group_by.is_empty() {
            stmt.push(" GROUP BY ");
            stmt.push(&self.group_by.join(", "));
        }

        if let Some(having) = &self.having {
            if let Some(having_stmt) = having.to_statement(dialect)? {
                stmt.push(" HAVING ");
                stmt.append(having_stmt);
            }
        }

        if !matches!(self.action, Action::Count | Action::Delete) && !self.order_by.is_empty() {
            let entries: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| match direction {
                    Some(dir) => format!("{column} {}", dir.as_sql()),
                    None => column.clone(),
                })
                .collect();
            stmt.push(" ORDER BY ");
            stmt.push(&entries.join(", "));
        }

        if let Some(limit) = self.limit {
            let limited = dialect.apply_limit(stmt.text(), self.offset, limit);
            stmt.set_text(limited);
        }

        if self.action == Action::Count && self.needs_complex_count() {
            let inner = stmt.text().to_string();
            stmt.set_text(format!("SELECT count(0) FROM ({inner}) AS a"));
        }

        debug!(
            sql = stmt.text(),
            params = stmt.param_count(),
            "rendered query"
        );
        Ok(stmt)
    }

    fn columns_clause(&self) -> String {
        match self.action {
            Action::Count => {
                if !self.needs_complex_count() {
                    return "count(0)".to_string();
                }
                if !self.group_by.is_empty() {
                    return self.group_by.join(", ");
                }
                let aggregates: Vec<String> = self
                    .columns
                    .iter()
                    .filter(|c| c.contains('('))
                    .cloned()
                    .collect();
                if !aggregates.is_empty() && self.having.is_none() && !self.distinct {
                    return aggregates.join(", ");
                }
                self.default_columns()
            }
            _ => self.default_columns(),
        }
    }

    fn default_columns(&self) -> String {
        if !self.columns.is_empty() {
            return self.columns.join(", ");
        }
        if let Some(alias) = &self.table_alias {
            return format!("{alias}.*");
        }
        match self.table.as_ref().and_then(TableRef::display_name) {
            Some(name) if !name.chars().any(char::is_whitespace) => format!("{name}.*"),
            _ => "*".to_string(),
        }
    }

    fn tables_clause(&self, dialect: &dyn Dialect) -> OrmResult<Statement> {
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| OrmError::missing_table("query has no table set"))?;
        let mut stmt = table.render(self.table_alias.as_deref(), dialect)?;

        for (alias, extra) in &self.extra_tables {
            stmt.push(", ");
            // The alias is skipped when it merely repeats the table name.
            let effective = match (alias, extra.display_name()) {
                (Some(a), Some(name)) if *a == name => None,
                (alias, _) => alias.as_deref(),
            };
            stmt.append(extra.render(effective, dialect)?);
        }
        Ok(stmt)
    }
}

#[cfg(test)]
mod tests;
