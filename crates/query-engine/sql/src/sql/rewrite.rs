//! Substitute clause tokens in a SQL template.
//!
//! A template marks where clauses go with tokens, matched case-insensitively:
//!
//! | token          | with content `C` | without content |
//! |----------------|------------------|-----------------|
//! | `[where]`      | `WHERE C`        | removed         |
//! | `[:where]`     | `AND C`          | removed         |
//! | `[where:]`     | `C AND`          | removed         |
//! | `[order_by]`   | `ORDER BY C`     | removed         |
//! | `[:order_by]`  | `,C`             | removed         |
//! | `[order_by:]`  | `C,`             | removed         |
//! | `[limit]`      | `LIMIT C`        | removed         |
//! | `[offset]`     | `OFFSET C`       | removed         |
//!
//! A token may appear any number of times; every occurrence gets the same
//! substitution. When content is given but the template has no token of that
//! family, a `[name]` token is appended first so the clause lands at the end.

use super::error::Error;
use super::helpers;

/// A family of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Where,
    OrderBy,
    Limit,
    Offset,
}

impl Token {
    fn name(self) -> &'static str {
        match self {
            Token::Where => "where",
            Token::OrderBy => "order_by",
            Token::Limit => "limit",
            Token::Offset => "offset",
        }
    }

    /// Each placeholder of the family, paired with what replaces it.
    fn substitutions(self, content: Option<&str>) -> Vec<(&'static str, String)> {
        let render = |f: fn(&str) -> String| content.map(f).unwrap_or_default();
        match self {
            Token::Where => vec![
                ("[where]", render(|c| format!("WHERE {c}"))),
                ("[:where]", render(|c| format!("AND {c}"))),
                ("[where:]", render(|c| format!("{c} AND"))),
            ],
            Token::OrderBy => vec![
                ("[order_by]", render(|c| format!("ORDER BY {c}"))),
                ("[:order_by]", render(|c| format!(",{c}"))),
                ("[order_by:]", render(|c| format!("{c},"))),
            ],
            Token::Limit => vec![("[limit]", render(|c| format!("LIMIT {c}")))],
            Token::Offset => vec![("[offset]", render(|c| format!("OFFSET {c}")))],
        }
    }

    fn is_present_in(self, query: &str) -> bool {
        self.substitutions(None)
            .iter()
            .any(|(placeholder, _)| helpers::contains_ignore_ascii_case(query, placeholder))
    }
}

/// Rewrites one SQL string, one token family at a time.
///
/// Every setter only touches its own family and can be called in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRewriter {
    pub(super) modified_query: String,
}

impl QueryRewriter {
    /// Start from `query`, trimmed. A blank query is rejected.
    pub fn new(query: &str) -> Result<Self, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::BlankQuery);
        }
        Ok(QueryRewriter {
            modified_query: query.to_string(),
        })
    }

    /// Substitute the `where` family with the given condition.
    pub fn set_filter_conditions(&mut self, conditions: Option<&str>) -> &mut Self {
        self.rewrite(Token::Where, conditions);
        self
    }

    /// Substitute the `order_by` family with the given ORDER BY list.
    pub fn set_order_by(&mut self, order_by: Option<&str>) -> &mut Self {
        self.rewrite(Token::OrderBy, order_by);
        self
    }

    pub fn set_limit(&mut self, limit: Option<u64>) -> &mut Self {
        let limit = limit.map(|limit| limit.to_string());
        self.rewrite(Token::Limit, limit.as_deref());
        self
    }

    pub fn set_offset(&mut self, offset: Option<u64>) -> &mut Self {
        let offset = offset.map(|offset| offset.to_string());
        self.rewrite(Token::Offset, offset.as_deref());
        self
    }

    /// Like `set_limit`, from raw text. An empty string means no limit;
    /// anything but a non-negative integer is rejected.
    pub fn set_limit_str(&mut self, limit: &str) -> Result<&mut Self, Error> {
        let limit = parse_numeric("limit", limit)?;
        Ok(self.set_limit(limit))
    }

    /// Like `set_offset`, from raw text. An empty string means no offset;
    /// anything but a non-negative integer is rejected.
    pub fn set_offset_str(&mut self, offset: &str) -> Result<&mut Self, Error> {
        let offset = parse_numeric("offset", offset)?;
        Ok(self.set_offset(offset))
    }

    pub fn modified_query(&self) -> &str {
        &self.modified_query
    }

    pub fn into_sql(self) -> String {
        self.modified_query
    }

    fn rewrite(&mut self, token: Token, content: Option<&str>) {
        let content = content.filter(|content| !content.is_empty());
        if content.is_some() && !token.is_present_in(&self.modified_query) {
            self.modified_query.push_str(" [");
            self.modified_query.push_str(token.name());
            self.modified_query.push(']');
        }
        for (placeholder, replacement) in token.substitutions(content) {
            self.modified_query =
                helpers::replace_ignore_ascii_case(&self.modified_query, placeholder, &replacement);
        }
    }
}

fn parse_numeric(clause: &'static str, value: &str) -> Result<Option<u64>, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| Error::NotNumeric {
        clause,
        value: value.to_string(),
    })
}
