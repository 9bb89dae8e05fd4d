//! # quarry
//!
//! A query-building ORM core with pluggable storage adapters.
//!
//! ## Features
//!
//! - **Fluent queries**: [`Query`] assembles SELECT/COUNT/DELETE statements
//!   from tables, joins, conditions, grouping, ordering, and limits
//! - **Predicate trees**: [`Condition`] accumulates AND/OR clauses with
//!   list/sub-query/NULL operator normalization
//! - **Positional parameters**: every rendered [`Statement`] carries its
//!   bound values in placeholder order; nothing is interpolated until an
//!   adapter asks for it
//! - **Pluggable backends**: dialect quirks (identifier quoting, limit
//!   clauses, literal rendering) live behind [`Dialect`], execution behind
//!   [`Adapter`] — SQL engines, REST backends, and test doubles all fit
//! - **Light models**: [`Record`] tracks dirty fields and persists through
//!   any adapter; [`ModelRegistry`] is injected, never global
//!
//! ## Building a query
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
//!
//! assert_eq!(
//!     stmt.text(),
//!     "SELECT users.* FROM users WHERE active = ? AND age > ? \
//!      ORDER BY name ASC LIMIT 10 OFFSET 20"
//! );
//! ```

pub mod adapter;
pub mod condition;
pub mod error;
pub mod ident;
pub mod model;
pub mod query;
pub mod statement;
pub mod value;

pub use adapter::{Adapter, Dialect, ExecResult, GenericDialect, Row};
pub use condition::{Condition, Connector, Operand, Operator, QuoteMode};
pub use error::{OrmError, OrmResult};
pub use ident::Ident;
pub use model::{ModelDef, ModelRegistry, Record};
pub use query::{
    Action, ExportFilter, ExportOrder, Join, JoinKind, OnClause, Query, QueryExport,
    SortDirection, TableRef,
};
pub use statement::Statement;
pub use value::Value;
