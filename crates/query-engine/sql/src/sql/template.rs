//! A SQL template: the SQL text with clause tokens, plus its own bind values.

use std::str::FromStr;

use super::error::Error;
use super::rewrite::QueryRewriter;
use super::string::BindValues;

/// An immutable SQL template.
///
/// The SQL is kept trimmed and is never blank. Bind values are the named
/// parameters the template itself references, independent of any filter.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTemplate {
    sql: String,
    bind_values: BindValues,
}

impl QueryTemplate {
    pub fn new(sql: &str, bind_values: BindValues) -> Result<Self, Error> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(Error::BlankQuery);
        }
        Ok(QueryTemplate {
            sql: sql.to_string(),
            bind_values,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bind_values(&self) -> &BindValues {
        &self.bind_values
    }

    /// A fresh rewriter over this template's SQL.
    pub fn rewriter(&self) -> QueryRewriter {
        QueryRewriter {
            modified_query: self.sql.clone(),
        }
    }
}

/// A template without bind values.
impl FromStr for QueryTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryTemplate::new(s, BindValues::new())
    }
}
