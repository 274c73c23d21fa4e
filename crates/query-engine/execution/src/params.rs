//! Rewrite named placeholders into positional ones.
//!
//! Statements name their parameters (`:name`), drivers bind by position (`?`).
//! A sequence value expands into one `?` per element, which is how `IN`
//! lists are bound.

use query_engine_sql::sql::string::Statement;

use crate::error::Error;

/// A statement with positional placeholders and the values for them, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Positional {
    pub sql: String,
    pub values: Vec<serde_json::Value>,
}

/// Replace every `:name` placeholder of `statement` by `?`.
///
/// Quoted strings, quoted identifiers and comments are left alone, as are
/// `::` casts. Bind values that no placeholder refers to are ignored.
pub fn to_positional(statement: &Statement) -> Result<Positional, Error> {
    let sql = statement.sql.as_str();
    let bytes = sql.as_bytes();
    let mut positional = Positional {
        sql: String::with_capacity(sql.len()),
        values: Vec::with_capacity(statement.params.len()),
    };
    let mut copied = 0;
    let mut index = 0;

    while index < bytes.len() {
        match bytes[index] {
            quote @ (b'\'' | b'"' | b'`') => {
                index = find(bytes, index + 1, &[quote]).map_or(bytes.len(), |end| end + 1);
            }
            b'-' if bytes.get(index + 1) == Some(&b'-') => {
                index = find(bytes, index + 2, b"\n").unwrap_or(bytes.len());
            }
            b'/' if bytes.get(index + 1) == Some(&b'*') => {
                index = find(bytes, index + 2, b"*/").map_or(bytes.len(), |end| end + 2);
            }
            b':' if bytes.get(index + 1) == Some(&b':') => {
                index += 2;
            }
            b':' if matches!(bytes.get(index + 1), Some(b) if b.is_ascii_alphabetic() || *b == b'_') => {
                let end = index
                    + 1
                    + bytes[index + 1..]
                        .iter()
                        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                        .count();
                positional.sql.push_str(&sql[copied..index]);
                let name = &sql[index..end];
                let value = statement.params.get(name).ok_or_else(|| {
                    Error::InvalidArgument(format!("no value is bound to placeholder {name}"))
                })?;
                push_value(&mut positional, name, value)?;
                copied = end;
                index = end;
            }
            _ => index += 1,
        }
    }
    positional.sql.push_str(&sql[copied..]);
    Ok(positional)
}

fn push_value(
    positional: &mut Positional,
    name: &str,
    value: &serde_json::Value,
) -> Result<(), Error> {
    match value {
        serde_json::Value::Array(values) => {
            if values.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "placeholder {name} is bound to an empty list"
                )));
            }
            let placeholders = vec!["?"; values.len()];
            positional.sql.push_str(&placeholders.join(", "));
            positional.values.extend(values.iter().cloned());
        }
        serde_json::Value::Object(_) => {
            return Err(Error::InvalidArgument(format!(
                "placeholder {name} is bound to an object"
            )));
        }
        value => {
            positional.sql.push('?');
            positional.values.push(value.clone());
        }
    }
    Ok(())
}

/// The position of the first `needle` in `bytes` at or after `from`.
fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|position| from + position)
}
