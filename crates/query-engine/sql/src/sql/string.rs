//! Type definitions of a parameterized SQL statement.

use indexmap::IndexMap;
use serde::Serialize;

use super::error::Error;

/// Named bind values, in insertion order.
///
/// Names are stored in their placeholder form, with a leading colon (`:name`).
/// A name given without the colon gets one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BindValues(IndexMap<String, serde_json::Value>);

impl BindValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs, validating every name.
    pub fn try_from_iter<I, S>(values: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (S, serde_json::Value)>,
        S: AsRef<str>,
    {
        let mut bind_values = BindValues::new();
        for (name, value) in values {
            bind_values.insert(name.as_ref(), value)?;
        }
        Ok(bind_values)
    }

    /// Insert a value, returning the value previously bound to the same name.
    pub fn insert(
        &mut self,
        name: &str,
        value: serde_json::Value,
    ) -> Result<Option<serde_json::Value>, Error> {
        Ok(self.0.insert(placeholder_name(name)?, value))
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        placeholder_name(name)
            .ok()
            .and_then(|name| self.0.get(&name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, serde_json::Value> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append `other` after the values already present.
    /// Nothing is appended when a name is bound in both.
    pub fn merge(&mut self, other: BindValues) -> Result<(), Error> {
        if let Some(name) = other.names().find(|name| self.0.contains_key(*name)) {
            return Err(Error::BindValueCollision(name.to_string()));
        }
        self.0.extend(other.0);
        Ok(())
    }
}

impl IntoIterator for BindValues {
    type Item = (String, serde_json::Value);
    type IntoIter = indexmap::map::IntoIter<String, serde_json::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BindValues {
    type Item = (&'a String, &'a serde_json::Value);
    type IntoIter = indexmap::map::Iter<'a, String, serde_json::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Turn `name` or `:name` into `:name`, rejecting anything that is not an identifier.
pub fn placeholder_name(name: &str) -> Result<String, Error> {
    let identifier = name.strip_prefix(':').unwrap_or(name);
    let mut chars = identifier.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(format!(":{identifier}"))
    } else {
        Err(Error::InvalidBindName(name.to_string()))
    }
}

/// A SQL string ready to be prepared, along with the values for its named placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: BindValues,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use similar_asserts::assert_eq;

    #[test]
    fn names_are_stored_with_a_colon() {
        let bind_values =
            BindValues::try_from_iter([("status", json!("active")), (":age", json!(30))]).unwrap();
        assert_eq!(bind_values.names().collect::<Vec<_>>(), vec![":status", ":age"]);
        assert_eq!(bind_values.get("status"), Some(&json!("active")));
        assert_eq!(bind_values.get(":status"), Some(&json!("active")));
    }

    #[test]
    fn invalid_names_are_rejected() {
        for name in ["", ":", "1st", "a-b", "::x"] {
            assert_eq!(
                BindValues::new().insert(name, json!(1)),
                Err(Error::InvalidBindName(name.to_string()))
            );
        }
    }

    #[test]
    fn merge_appends_after_existing_values() {
        let mut bind_values = BindValues::try_from_iter([("b", json!(2)), ("a", json!(1))]).unwrap();
        bind_values
            .merge(BindValues::try_from_iter([("p1", json!("x"))]).unwrap())
            .unwrap();
        assert_eq!(bind_values.names().collect::<Vec<_>>(), vec![":b", ":a", ":p1"]);
    }

    #[test]
    fn merge_rejects_collisions() {
        let mut bind_values = BindValues::try_from_iter([("a", json!(1))]).unwrap();
        let other = BindValues::try_from_iter([("z", json!(0)), ("a", json!(2))]).unwrap();
        assert_eq!(
            bind_values.merge(other),
            Err(Error::BindValueCollision(":a".to_string()))
        );
        assert_eq!(bind_values.len(), 1);
        assert_eq!(bind_values.get("a"), Some(&json!(1)));
    }
}
