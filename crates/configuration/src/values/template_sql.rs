//! Where the SQL of a query template comes from.

use std::path::{Path, PathBuf};

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Template SQL as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TemplateSqlExternal {
    /// Refer to an external SQL file.
    File {
        /// Path to a SQL file, relative to the configuration directory.
        file: PathBuf,
    },
    /// Inline SQL string.
    Inline {
        /// An inline SQL string.
        inline: String,
    },
    InlineUntagged(
        /// An inline SQL string.
        String,
    ),
}

/// Template SQL after files have been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSql {
    FromFile { file: PathBuf, sql: String },
    Inline { sql: String },
}

impl TemplateSql {
    pub fn sql(&self) -> &str {
        match self {
            TemplateSql::FromFile { sql, .. } | TemplateSql::Inline { sql } => sql,
        }
    }
}

/// Template SQL, before or after reading files.
///
/// Deserializing always yields the external form; `parse_configuration`
/// resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TemplateSqlExternal", into = "TemplateSqlExternal")]
pub enum TemplateSqlEither {
    TemplateSql(TemplateSql),
    TemplateSqlExternal(TemplateSqlExternal),
}

impl TemplateSqlEither {
    /// The SQL text. Fails if the file it refers to has not been read yet.
    pub fn sql(&self) -> Result<&str, String> {
        match self {
            TemplateSqlEither::TemplateSql(resolved) => Ok(resolved.sql()),
            TemplateSqlEither::TemplateSqlExternal(
                TemplateSqlExternal::Inline { inline } | TemplateSqlExternal::InlineUntagged(inline),
            ) => Ok(inline),
            TemplateSqlEither::TemplateSqlExternal(TemplateSqlExternal::File { file }) => Err(
                format!("the SQL file {} was not read during parsing", file.display()),
            ),
        }
    }

    /// Read the file this refers to, if any, relative to `configuration_directory`.
    pub async fn resolve(&self, configuration_directory: &Path) -> Result<TemplateSql, String> {
        match self {
            TemplateSqlEither::TemplateSql(resolved) => Ok(resolved.clone()),
            TemplateSqlEither::TemplateSqlExternal(TemplateSqlExternal::File { file }) => {
                let path = configuration_directory.join(file);
                let sql = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|err| format!("{}: {err}", path.display()))?;
                Ok(TemplateSql::FromFile {
                    file: file.clone(),
                    sql,
                })
            }
            TemplateSqlEither::TemplateSqlExternal(
                TemplateSqlExternal::Inline { inline } | TemplateSqlExternal::InlineUntagged(inline),
            ) => Ok(TemplateSql::Inline {
                sql: inline.clone(),
            }),
        }
    }
}

impl From<&str> for TemplateSqlEither {
    fn from(value: &str) -> Self {
        TemplateSqlEither::TemplateSqlExternal(TemplateSqlExternal::InlineUntagged(
            value.to_string(),
        ))
    }
}

impl From<TemplateSqlExternal> for TemplateSqlEither {
    /// We use this to deserialize.
    fn from(value: TemplateSqlExternal) -> Self {
        TemplateSqlEither::TemplateSqlExternal(value)
    }
}

impl From<TemplateSqlEither> for TemplateSqlExternal {
    /// We use this to serialize.
    fn from(value: TemplateSqlEither) -> Self {
        match value {
            TemplateSqlEither::TemplateSqlExternal(value) => value,
            TemplateSqlEither::TemplateSql(TemplateSql::FromFile { file, .. }) => {
                TemplateSqlExternal::File { file }
            }
            TemplateSqlEither::TemplateSql(TemplateSql::Inline { sql }) => {
                TemplateSqlExternal::InlineUntagged(sql)
            }
        }
    }
}

/// Described by the form it is written in.
impl JsonSchema for TemplateSqlEither {
    fn schema_name() -> String {
        TemplateSqlExternal::schema_name()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        TemplateSqlExternal::json_schema(gen)
    }
}
