//! Errors for query execution.

use query_engine_translation::translation;

/// A type for execution errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid data source: {0}")]
    InvalidDataSource(String),
    #[error(transparent)]
    Translation(#[from] translation::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unexpected value: {0}")]
    UnexpectedValue(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// Was the request itself at fault.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Error::Translation(err) => err.is_invalid_argument(),
            Error::InvalidArgument(_) => true,
            Error::InvalidDataSource(_) | Error::UnexpectedValue(_) | Error::Database(_) => false,
        }
    }

    /// Did no translator accept one of the filters.
    pub fn is_translator_not_found(&self) -> bool {
        matches!(
            self,
            Error::Translation(translation::Error::TranslatorNotFound { .. })
        )
    }
}
