use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Secret;
use crate::environment::{self, Environment};

/// The URI of the database, e.g. `sqlite://data.db`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ConnectionUri(pub Secret);

impl ConnectionUri {
    /// The URI itself, reading it from the environment if need be.
    pub fn resolve(&self, environment: impl Environment) -> Result<String, environment::Error> {
        match &self.0 {
            Secret::Plain(value) => Ok(value.clone()),
            Secret::FromEnvironment { variable } => environment.read(variable),
        }
    }
}

impl From<String> for ConnectionUri {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<&str> for ConnectionUri {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}
