//! Error types for sqlshape

use thiserror::Error;

/// Result type alias for sqlshape operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while compiling a query.
///
/// Every variant is a construction-time failure caused by invalid input at the
/// call site; none of them are transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// An operator map contained a key outside the supported operator set
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Join type outside `inner`, `left`, `right`
    #[error("Invalid join type: {0}")]
    InvalidJoinType(String),

    /// Inline rendering was requested without a value formatter
    #[error("Inline rendering requires a value formatter")]
    EscapeBlockMissing,

    /// ORDER BY direction outside `ASC`, `DESC`
    #[error("Invalid order direction: {0}")]
    InvalidOrderDirection(String),

    /// A join alias is already bound in this query
    #[error("Duplicate join alias: {0}")]
    DuplicateAlias(String),

    /// Input that cannot be used as a filter value
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl SqlError {
    /// Create an invalid value error
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    /// Check if this is an invalid operator error
    pub fn is_invalid_operator(&self) -> bool {
        matches!(self, Self::InvalidOperator(_))
    }

    /// Check if this error belongs to the query-shape family (join type, alias, order).
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidJoinType(_) | Self::DuplicateAlias(_) | Self::InvalidOrderDirection(_)
        )
    }
}
