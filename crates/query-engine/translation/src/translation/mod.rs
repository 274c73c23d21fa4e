//! Translate an abstract request into the SQL statements that answer it.

pub mod error;
pub mod query;

pub use error::Error;
