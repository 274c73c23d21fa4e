//! Errors raised while building a request.

/// A request was built with an invalid argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("List of columns in filter cannot be empty")]
    EmptyColumns,
    #[error("Filter field cannot be blank")]
    BlankColumn,
    #[error("Filter variant cannot be blank")]
    BlankVariant,
    #[error("Unsupported operator \"{0}\"")]
    UnsupportedOperator(String),
    #[error("Invalid value for operator {operator}: {reason}")]
    InvalidFilterValue {
        operator: &'static str,
        reason: String,
    },
    #[error("Sort field cannot be empty")]
    BlankSortColumn,
    #[error("Unsupported sort direction \"{0}\"")]
    UnsupportedDirection(String),
    #[error("Limit must be greater or equal 1")]
    InvalidLimit,
}
