//! Error types for quarry

use thiserror::Error;

/// Result type alias for quarry operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for query building and adapter execution.
///
/// All builder errors are programmer/usage errors surfaced synchronously at
/// the call that violates the contract; none are retried internally.
#[derive(Debug, Error)]
pub enum OrmError {
    /// An operation needing a target table was invoked with no table set
    #[error("No table set: {0}")]
    MissingTable(String),

    /// A table alias collides with an already-registered table or alias
    #[error("Duplicate table alias: {0}")]
    DuplicateAlias(String),

    /// A numeric argument was out of range (limit/offset/page)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An ORDER BY direction other than ASC/DESC
    #[error("Invalid sort direction: {0}")]
    InvalidSortDirection(String),

    /// An operator incompatible with a list or multi-row subquery operand
    #[error("Operator {operator} cannot be used with a {operand} operand")]
    UnsupportedOperator { operator: String, operand: String },

    /// Placeholder count does not match the bound parameter count
    #[error("Malformed statement: {placeholders} placeholders, {params} params")]
    MalformedStatement { placeholders: usize, params: usize },

    /// The query cannot be expressed as a simplified key-value export
    #[error("Query cannot be exported: {0}")]
    ExportUnsupported(String),

    /// Identifier validation error
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Field access error on a model record
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Adapter-side execution error, surfaced verbatim
    #[error("Adapter error: {0}")]
    Adapter(String),
}

impl OrmError {
    /// Create a missing-table error
    pub fn missing_table(message: impl Into<String>) -> Self {
        Self::MissingTable(message.into())
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an invalid-identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    pub(crate) fn unsupported_operator(
        operator: impl Into<String>,
        operand: impl Into<String>,
    ) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
            operand: operand.into(),
        }
    }

    /// Check if this is a missing-table error
    pub fn is_missing_table(&self) -> bool {
        matches!(self, Self::MissingTable(_))
    }

    /// Check if this is an export-unsupported error
    pub fn is_export_unsupported(&self) -> bool {
        matches!(self, Self::ExportUnsupported(_))
    }
}
