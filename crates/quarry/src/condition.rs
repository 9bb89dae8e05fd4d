//! Predicate trees for WHERE/HAVING clauses.
//!
//! A [`Condition`] accumulates clauses joined by AND/OR. Each clause is
//! either a predicate (left operand, operator, right operand, quote mode), a
//! nested parenthesized [`Condition`], or a pre-built raw [`Statement`].
//! Rendering normalizes operators against their operands (list and subquery
//! rewrites, NULL rewrites, LIKE-family wildcards) and produces one
//! [`Statement`] with parameters in left-to-right placeholder order.

use crate::adapter::Dialect;
use crate::error::{OrmError, OrmResult};
use crate::query::Query;
use crate::statement::Statement;
use crate::value::Value;

/// Predicate operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<>` (alternate not-equal spelling)
    AltNotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessEqual,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `BETWEEN ? AND ?`
    Between,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
    /// `LIKE '%value%'`
    Contains,
    /// `LIKE 'value%'`
    BeginsWith,
    /// `LIKE '%value'`
    EndsWith,
}

impl Operator {
    /// The SQL spelling of this operator.
    ///
    /// The LIKE-family shorthands (`Contains`, `BeginsWith`, `EndsWith`) are
    /// always rewritten to `LIKE` before rendering.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::AltNotEqual => "<>",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::Like | Operator::Contains | Operator::BeginsWith | Operator::EndsWith => {
                "LIKE"
            }
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Between => "BETWEEN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Controls which sides of a predicate become bound `?` placeholders.
///
/// A "quoted" side is emitted as a placeholder with its value pushed onto the
/// statement's parameter list; an unquoted side is emitted verbatim as SQL
/// text (column references, already-safe expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteMode {
    /// Both sides verbatim (column-to-column comparisons).
    None,
    /// Bind only the left side.
    Left,
    /// Bind only the right side. The default.
    #[default]
    Right,
    /// Bind both sides.
    Both,
}

impl QuoteMode {
    fn quotes_left(&self) -> bool {
        matches!(self, QuoteMode::Left | QuoteMode::Both)
    }

    fn quotes_right(&self) -> bool {
        matches!(self, QuoteMode::Right | QuoteMode::Both)
    }
}

/// Connector joining a clause to the clauses before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    fn as_sql(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// One side of a predicate.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A column reference, emitted verbatim unless the quote mode binds it.
    Column(String),
    /// A literal value.
    Value(Value),
    /// A list of literal values (IN / NOT IN / BETWEEN).
    List(Vec<Value>),
    /// A nested sub-query, rendered parenthesized.
    Subquery(Box<Query>),
    /// A pre-built fragment, spliced as-is.
    Statement(Statement),
}

#[derive(Debug, Clone)]
enum ClauseBody {
    Predicate {
        left: Operand,
        operator: Operator,
        right: Operand,
        quote: QuoteMode,
    },
    Nested(Condition),
    Raw(Statement),
}

#[derive(Debug, Clone)]
struct Clause {
    body: ClauseBody,
    connector: Connector,
}

/// An ordered tree of predicate clauses joined by AND/OR.
#[derive(Debug, Clone, Default)]
pub struct Condition {
    clauses: Vec<Clause>,
}

impl Condition {
    /// Create an empty condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accumulated clauses (dropped clauses included).
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// True when no clauses have been added.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// True when any clause was recorded with an OR connector.
    pub(crate) fn has_or_connector(&self) -> bool {
        self.clauses.iter().any(|c| c.connector == Connector::Or)
    }

    fn push(mut self, body: ClauseBody, connector: Connector) -> Self {
        self.clauses.push(Clause { body, connector });
        self
    }

    fn push_predicate(
        self,
        connector: Connector,
        left: Operand,
        operator: Operator,
        right: Operand,
        quote: QuoteMode,
    ) -> Self {
        self.push(
            ClauseBody::Predicate {
                left,
                operator,
                right,
                quote,
            },
            connector,
        )
    }

    // ==================== Core adders ====================

    /// AND a nested condition, rendered parenthesized.
    pub fn and(self, nested: Condition) -> Self {
        self.push(ClauseBody::Nested(nested), Connector::And)
    }

    /// OR a nested condition, rendered parenthesized.
    pub fn or(self, nested: Condition) -> Self {
        self.push(ClauseBody::Nested(nested), Connector::Or)
    }

    /// AND a pre-built statement fragment, spliced as-is.
    pub fn and_statement(self, statement: Statement) -> Self {
        self.push(ClauseBody::Raw(statement), Connector::And)
    }

    /// OR a pre-built statement fragment, spliced as-is.
    pub fn or_statement(self, statement: Statement) -> Self {
        self.push(ClauseBody::Raw(statement), Connector::Or)
    }

    /// AND `column = value`.
    pub fn and_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::Equal, value)
    }

    /// OR `column = value`.
    pub fn or_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::Equal, value)
    }

    /// AND `column <operator> value`.
    pub fn and_cmp(
        self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.and_cmp_mode(column, operator, value, QuoteMode::Right)
    }

    /// OR `column <operator> value`.
    pub fn or_cmp(
        self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.or_cmp_mode(column, operator, value, QuoteMode::Right)
    }

    /// AND `column <operator> value` with an explicit quote mode.
    pub fn and_cmp_mode(
        self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
        quote: QuoteMode,
    ) -> Self {
        self.push_predicate(
            Connector::And,
            Operand::Column(column.into()),
            operator,
            Operand::Value(value.into()),
            quote,
        )
    }

    /// OR `column <operator> value` with an explicit quote mode.
    pub fn or_cmp_mode(
        self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
        quote: QuoteMode,
    ) -> Self {
        self.push_predicate(
            Connector::Or,
            Operand::Column(column.into()),
            operator,
            Operand::Value(value.into()),
            quote,
        )
    }

    /// AND a column-to-column comparison; nothing is bound.
    pub fn and_columns(
        self,
        left: impl Into<String>,
        operator: Operator,
        right: impl Into<String>,
    ) -> Self {
        self.push_predicate(
            Connector::And,
            Operand::Column(left.into()),
            operator,
            Operand::Column(right.into()),
            QuoteMode::None,
        )
    }

    /// OR a column-to-column comparison; nothing is bound.
    pub fn or_columns(
        self,
        left: impl Into<String>,
        operator: Operator,
        right: impl Into<String>,
    ) -> Self {
        self.push_predicate(
            Connector::Or,
            Operand::Column(left.into()),
            operator,
            Operand::Column(right.into()),
            QuoteMode::None,
        )
    }

    /// AND one `column = value` clause per map entry, in iteration order.
    pub fn and_map<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in pairs {
            self = self.and_eq(column, value);
        }
        self
    }

    /// OR one `column = value` clause per map entry, in iteration order.
    pub fn or_map<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in pairs {
            self = self.or_eq(column, value);
        }
        self
    }

    /// AND `column IN (values...)`.
    pub fn and_in<T: Into<Value>>(self, column: impl Into<String>, values: Vec<T>) -> Self {
        self.push_list(Connector::And, column, Operator::In, values)
    }

    /// OR `column IN (values...)`.
    pub fn or_in<T: Into<Value>>(self, column: impl Into<String>, values: Vec<T>) -> Self {
        self.push_list(Connector::Or, column, Operator::In, values)
    }

    /// AND `column NOT IN (values...)`.
    pub fn and_not_in<T: Into<Value>>(self, column: impl Into<String>, values: Vec<T>) -> Self {
        self.push_list(Connector::And, column, Operator::NotIn, values)
    }

    /// OR `column NOT IN (values...)`.
    pub fn or_not_in<T: Into<Value>>(self, column: impl Into<String>, values: Vec<T>) -> Self {
        self.push_list(Connector::Or, column, Operator::NotIn, values)
    }

    fn push_list<T: Into<Value>>(
        self,
        connector: Connector,
        column: impl Into<String>,
        operator: Operator,
        values: Vec<T>,
    ) -> Self {
        self.push_predicate(
            connector,
            Operand::Column(column.into()),
            operator,
            Operand::List(values.into_iter().map(Into::into).collect()),
            QuoteMode::Right,
        )
    }

    /// AND `column <operator> (subquery)`.
    pub fn and_subquery(
        self,
        column: impl Into<String>,
        operator: Operator,
        subquery: Query,
    ) -> Self {
        self.push_predicate(
            Connector::And,
            Operand::Column(column.into()),
            operator,
            Operand::Subquery(Box::new(subquery)),
            QuoteMode::Right,
        )
    }

    /// OR `column <operator> (subquery)`.
    pub fn or_subquery(
        self,
        column: impl Into<String>,
        operator: Operator,
        subquery: Query,
    ) -> Self {
        self.push_predicate(
            Connector::Or,
            Operand::Column(column.into()),
            operator,
            Operand::Subquery(Box::new(subquery)),
            QuoteMode::Right,
        )
    }

    // ==================== Convenience predicates ====================

    /// AND `column != value`.
    pub fn and_not(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::NotEqual, value)
    }

    /// OR `column != value`.
    pub fn or_not(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::NotEqual, value)
    }

    /// AND `column LIKE pattern`.
    pub fn and_like(self, column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::Like, pattern)
    }

    /// OR `column LIKE pattern`.
    pub fn or_like(self, column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::Like, pattern)
    }

    /// AND `column NOT LIKE pattern`.
    pub fn and_not_like(self, column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::NotLike, pattern)
    }

    /// OR `column NOT LIKE pattern`.
    pub fn or_not_like(self, column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::NotLike, pattern)
    }

    /// AND `column > value`.
    pub fn and_greater(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::GreaterThan, value)
    }

    /// OR `column > value`.
    pub fn or_greater(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::GreaterThan, value)
    }

    /// AND `column >= value`.
    pub fn and_greater_equal(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::GreaterEqual, value)
    }

    /// OR `column >= value`.
    pub fn or_greater_equal(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::GreaterEqual, value)
    }

    /// AND `column < value`.
    pub fn and_less(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::LessThan, value)
    }

    /// OR `column < value`.
    pub fn or_less(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::LessThan, value)
    }

    /// AND `column <= value`.
    pub fn and_less_equal(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::LessEqual, value)
    }

    /// OR `column <= value`.
    pub fn or_less_equal(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::LessEqual, value)
    }

    /// AND `column IS NULL`.
    pub fn and_null(self, column: impl Into<String>) -> Self {
        self.and_cmp(column, Operator::IsNull, Value::Null)
    }

    /// OR `column IS NULL`.
    pub fn or_null(self, column: impl Into<String>) -> Self {
        self.or_cmp(column, Operator::IsNull, Value::Null)
    }

    /// AND `column IS NOT NULL`.
    pub fn and_not_null(self, column: impl Into<String>) -> Self {
        self.and_cmp(column, Operator::IsNotNull, Value::Null)
    }

    /// OR `column IS NOT NULL`.
    pub fn or_not_null(self, column: impl Into<String>) -> Self {
        self.or_cmp(column, Operator::IsNotNull, Value::Null)
    }

    /// AND `column BETWEEN from AND to`.
    pub fn and_between(
        self,
        column: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        self.push_list(
            Connector::And,
            column,
            Operator::Between,
            vec![from.into(), to.into()],
        )
    }

    /// OR `column BETWEEN from AND to`.
    pub fn or_between(
        self,
        column: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        self.push_list(
            Connector::Or,
            column,
            Operator::Between,
            vec![from.into(), to.into()],
        )
    }

    /// AND `column LIKE 'value%'`.
    pub fn and_begins_with(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::BeginsWith, value)
    }

    /// OR `column LIKE 'value%'`.
    pub fn or_begins_with(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::BeginsWith, value)
    }

    /// AND `column LIKE '%value'`.
    pub fn and_ends_with(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::EndsWith, value)
    }

    /// OR `column LIKE '%value'`.
    pub fn or_ends_with(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::EndsWith, value)
    }

    /// AND `column LIKE '%value%'`.
    pub fn and_contains(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_cmp(column, Operator::Contains, value)
    }

    /// OR `column LIKE '%value%'`.
    pub fn or_contains(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_cmp(column, Operator::Contains, value)
    }

    // ==================== Rendering ====================

    /// Render all renderable clauses into one statement.
    ///
    /// Returns `Ok(None)` when nothing renders (empty condition, or every
    /// clause was dropped); callers treat that as "no WHERE/HAVING needed".
    ///
    /// The first clause never emits its connector. Each later clause emits
    /// its own connector, with one preserved quirk: the second renderable
    /// clause emits `OR` whenever the first clause was recorded with an OR
    /// connector, regardless of its own.
    pub fn to_statement(&self, dialect: &dyn Dialect) -> OrmResult<Option<Statement>> {
        let mut rendered: Vec<(Connector, Statement)> = Vec::new();
        for clause in &self.clauses {
            if let Some(stmt) = clause.body.render(dialect)? {
                rendered.push((clause.connector, stmt));
            }
        }

        if rendered.is_empty() {
            return Ok(None);
        }

        let first_connector = rendered[0].0;
        let mut out = Statement::empty();
        for (idx, (connector, stmt)) in rendered.into_iter().enumerate() {
            if idx > 0 {
                let effective = if idx == 1 && first_connector == Connector::Or {
                    Connector::Or
                } else {
                    connector
                };
                out.push(&format!(" {} ", effective.as_sql()));
            }
            out.append(stmt);
        }
        Ok(Some(out))
    }

    /// Visit every clause in order; used by the export surface.
    pub(crate) fn export_clauses(&self) -> impl Iterator<Item = ExportClause<'_>> {
        self.clauses.iter().map(|clause| match &clause.body {
            ClauseBody::Predicate {
                left,
                operator,
                right,
                quote,
            } => ExportClause::Predicate {
                connector: clause.connector,
                left,
                operator: *operator,
                right,
                quote: *quote,
            },
            ClauseBody::Nested(_) | ClauseBody::Raw(_) => ExportClause::Opaque,
        })
    }
}

/// A borrowed clause view consumed by [`Query::export`](crate::Query::export).
pub(crate) enum ExportClause<'a> {
    Predicate {
        connector: Connector,
        left: &'a Operand,
        operator: Operator,
        right: &'a Operand,
        quote: QuoteMode,
    },
    /// Nested conditions and raw fragments cannot be exported.
    Opaque,
}

impl ClauseBody {
    fn render(&self, dialect: &dyn Dialect) -> OrmResult<Option<Statement>> {
        match self {
            ClauseBody::Nested(nested) => match nested.to_statement(dialect)? {
                Some(inner) => {
                    let mut stmt = Statement::raw("(");
                    stmt.append(inner);
                    stmt.push(")");
                    Ok(Some(stmt))
                }
                None => Ok(None),
            },
            ClauseBody::Raw(stmt) => Ok(Some(stmt.clone())),
            ClauseBody::Predicate {
                left,
                operator,
                right,
                quote,
            } => render_predicate(left, *operator, right, *quote, dialect),
        }
    }
}

fn render_predicate(
    left: &Operand,
    operator: Operator,
    right: &Operand,
    quote: QuoteMode,
    dialect: &dyn Dialect,
) -> OrmResult<Option<Statement>> {
    // Lists rewrite the operator family first.
    if let Operand::List(values) = right {
        if operator == Operator::Between {
            if values.len() != 2 {
                return Err(OrmError::invalid_argument(format!(
                    "BETWEEN requires exactly 2 values, got {}",
                    values.len()
                )));
            }
            let mut stmt = render_side(left, quote.quotes_left(), dialect)?;
            stmt.push(" BETWEEN ");
            stmt.push_bind(values[0].clone());
            stmt.push(" AND ");
            stmt.push_bind(values[1].clone());
            return Ok(Some(stmt));
        }

        let list_op = normalize_multi_operator(operator, "list")?;
        if values.is_empty() {
            // Empty IN can never match; empty NOT IN excludes nothing and
            // the clause is dropped entirely.
            return match list_op {
                Operator::In => Ok(Some(Statement::raw("(0 = 1)"))),
                _ => Ok(None),
            };
        }

        let mut stmt = render_side(left, quote.quotes_left(), dialect)?;
        stmt.push(&format!(" {} (", list_op.as_sql()));
        for (idx, value) in values.iter().enumerate() {
            if idx > 0 {
                stmt.push(",");
            }
            stmt.push_bind(value.clone());
        }
        stmt.push(")");
        return Ok(Some(stmt));
    }

    // A sub-query not limited to a single row is a multi-row operand and
    // follows the same family rewrite as lists.
    if let Operand::Subquery(subquery) = right {
        if subquery.limit() != Some(1) {
            let multi_op = match operator {
                Operator::Between => Operator::Between,
                other => normalize_multi_operator(other, "subquery")?,
            };
            let mut stmt = render_side(left, quote.quotes_left(), dialect)?;
            stmt.push(&format!(" {} (", multi_op.as_sql()));
            stmt.append(subquery.render(dialect)?);
            stmt.push(")");
            return Ok(Some(stmt));
        }
        // A single-row sub-query is a scalar operand; fall through.
    }

    // NULL right-hand operands rewrite (in)equality to IS [NOT] NULL.
    let operator = if matches!(right, Operand::Value(Value::Null)) {
        match operator {
            Operator::Equal => Operator::IsNull,
            Operator::NotEqual | Operator::AltNotEqual => Operator::IsNotNull,
            other => other,
        }
    } else {
        operator
    };

    if matches!(operator, Operator::IsNull | Operator::IsNotNull) {
        let mut stmt = render_side(left, quote.quotes_left(), dialect)?;
        stmt.push(&format!(" {}", operator.as_sql()));
        return Ok(Some(stmt));
    }

    // LIKE-family shorthands fold wildcards into the bound value.
    let (operator, right_owned) = match operator {
        Operator::Contains | Operator::BeginsWith | Operator::EndsWith => {
            let plain = match right {
                Operand::Value(v) => v.to_plain_string(),
                _ => {
                    return Err(OrmError::invalid_argument(
                        "LIKE-family shorthands require a literal right operand",
                    ));
                }
            };
            let pattern = match operator {
                Operator::Contains => format!("%{plain}%"),
                Operator::BeginsWith => format!("{plain}%"),
                _ => format!("%{plain}"),
            };
            (Operator::Like, Operand::Value(Value::Text(pattern)))
        }
        other => (other, right.clone()),
    };

    let mut stmt = render_side(left, quote.quotes_left(), dialect)?;
    stmt.push(&format!(" {} ", operator.as_sql()));
    let rhs = render_side(&right_owned, quote.quotes_right(), dialect)?;
    stmt.append(rhs);
    Ok(Some(stmt))
}

fn normalize_multi_operator(operator: Operator, operand: &str) -> OrmResult<Operator> {
    match operator {
        Operator::Equal | Operator::In => Ok(Operator::In),
        Operator::NotEqual | Operator::AltNotEqual | Operator::NotIn => Ok(Operator::NotIn),
        other => Err(OrmError::unsupported_operator(format!("{other:?}"), operand)),
    }
}

fn render_side(operand: &Operand, bind: bool, dialect: &dyn Dialect) -> OrmResult<Statement> {
    match operand {
        Operand::Column(name) => {
            if bind {
                let mut stmt = Statement::empty();
                stmt.push_bind(Value::Text(name.clone()));
                Ok(stmt)
            } else {
                Ok(Statement::raw(name.clone()))
            }
        }
        Operand::Value(value) => {
            if bind {
                let mut stmt = Statement::empty();
                stmt.push_bind(value.clone());
                Ok(stmt)
            } else {
                Ok(Statement::raw(value.to_plain_string()))
            }
        }
        Operand::Subquery(subquery) => {
            let mut stmt = Statement::raw("(");
            stmt.append(subquery.render(dialect)?);
            stmt.push(")");
            Ok(stmt)
        }
        Operand::Statement(inner) => Ok(inner.clone()),
        Operand::List(_) => Err(OrmError::invalid_argument(
            "a value list cannot be used as a scalar operand",
        )),
    }
}
