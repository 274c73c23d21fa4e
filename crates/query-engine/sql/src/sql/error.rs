//! Errors for templates and rewriting.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Query cannot be blank")]
    BlankQuery,
    #[error("{clause} must be null or number, got \"{value}\"")]
    NotNumeric { clause: &'static str, value: String },
    #[error("invalid bind parameter name \"{0}\"")]
    InvalidBindName(String),
    #[error("bind parameter \"{0}\" is defined more than once")]
    BindValueCollision(String),
}
