//! Errors for translation.

use query_engine_models::models;
use query_engine_sql::sql;

/// A type for translation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unable to find translator for filter {filter} (variant \"{variant}\")")]
    TranslatorNotFound { variant: String, filter: String },
    #[error("{translator} cannot translate filter {filter}")]
    UnsupportedFilter {
        translator: &'static str,
        filter: String,
    },
    #[error(transparent)]
    InvalidRequest(#[from] models::Error),
    #[error(transparent)]
    Sql(sql::error::Error),
    #[error("Unexpected value: {0}")]
    UnexpectedValue(String),
}

impl Error {
    /// Was the request itself at fault, as opposed to the configured
    /// templates or translators.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Error::UnsupportedFilter { .. } | Error::InvalidRequest(_) => true,
            Error::TranslatorNotFound { .. } | Error::Sql(_) | Error::UnexpectedValue(_) => false,
        }
    }
}

/// Bind values that collide can only come from a misbehaving translator.
impl From<sql::error::Error> for Error {
    fn from(err: sql::error::Error) -> Self {
        match err {
            sql::error::Error::BindValueCollision(_) => Error::UnexpectedValue(err.to_string()),
            err => Error::Sql(err),
        }
    }
}
