//! The first version of the configuration format.

use std::path::Path;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{ParseConfigurationError, WriteParsedConfigurationError};
use crate::values::{ConnectionUri, Secret, TemplateSql, TemplateSqlEither};

pub const CURRENT_VERSION: u32 = 1;
pub const CONFIGURATION_FILENAME: &str = "configuration.json";
pub const CONFIGURATION_JSONSCHEMA_FILENAME: &str = "schema.json";
pub const DEFAULT_CONNECTION_URI_VARIABLE: &str = "DATATABLES_DATABASE_URL";

/// The configuration as written on disk.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    /// Which version of the configuration format are we using
    pub version: u32,
    /// Connection string for the database
    pub connection_uri: ConnectionUri,
    /// The columns DataTables refers to by index, in display order
    #[serde(default)]
    pub columns: Vec<String>,
    /// The query returning the rows
    pub main_query: TemplateConfiguration,
    /// The query returning the number of rows
    pub count_query: TemplateConfiguration,
}

/// A query template and the values it binds itself.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfiguration {
    /// SQL with optional `[where]`, `[order_by]`, `[limit]` and `[offset]` tokens
    pub sql: TemplateSqlEither,
    /// Values of the named parameters the SQL refers to, bound in this order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub bind_values: IndexMap<String, serde_json::Value>,
}

impl TemplateConfiguration {
    pub fn inline(sql: &str) -> Self {
        TemplateConfiguration {
            sql: sql.into(),
            bind_values: IndexMap::new(),
        }
    }
}

impl ParsedConfiguration {
    /// A starting point, to be edited.
    pub fn initial() -> Self {
        ParsedConfiguration {
            version: CURRENT_VERSION,
            connection_uri: ConnectionUri(Secret::FromEnvironment {
                variable: DEFAULT_CONNECTION_URI_VARIABLE.into(),
            }),
            columns: vec!["id".to_string(), "name".to_string()],
            main_query: TemplateConfiguration::inline(
                "SELECT id, name FROM my_table [where] [order_by] [limit] [offset]",
            ),
            count_query: TemplateConfiguration::inline("SELECT COUNT(*) FROM my_table [where]"),
        }
    }
}

pub async fn parse_configuration(
    configuration_dir: impl AsRef<Path>,
) -> Result<ParsedConfiguration, ParseConfigurationError> {
    let configuration_file = configuration_dir.as_ref().join(CONFIGURATION_FILENAME);

    let configuration_file_contents =
        fs::read_to_string(&configuration_file)
            .await
            .map_err(|err| {
                ParseConfigurationError::IoErrorButStringified(format!(
                    "{}: {}",
                    &configuration_file.display(),
                    err
                ))
            })?;

    let mut parsed_config: ParsedConfiguration = serde_json::from_str(&configuration_file_contents)
        .map_err(|error| ParseConfigurationError::ParseError {
            file_path: configuration_file.clone(),
            line: error.line(),
            column: error.column(),
            message: error.to_string(),
        })?;

    if parsed_config.version != CURRENT_VERSION {
        return Err(ParseConfigurationError::UnsupportedVersion {
            version: parsed_config.version,
            expected: CURRENT_VERSION,
        });
    }

    // look for template sql file references and read from disk.
    for template in [&mut parsed_config.main_query, &mut parsed_config.count_query] {
        template.sql = TemplateSqlEither::TemplateSql(
            template
                .sql
                .resolve(configuration_dir.as_ref())
                .await
                .map_err(ParseConfigurationError::IoErrorButStringified)?,
        );
    }

    tracing::debug!(file = %configuration_file.display(), "Parsed configuration");
    Ok(parsed_config)
}

pub async fn write_parsed_configuration(
    parsed_config: ParsedConfiguration,
    out_dir: impl AsRef<Path>,
) -> Result<(), WriteParsedConfigurationError> {
    let configuration_file = out_dir.as_ref().to_owned().join(CONFIGURATION_FILENAME);
    fs::create_dir_all(out_dir.as_ref()).await?;

    // create the configuration file
    fs::write(
        configuration_file,
        serde_json::to_string_pretty(&parsed_config)
            .map_err(|e| WriteParsedConfigurationError::IoError(e.into()))?
            + "\n",
    )
    .await?;

    // write template sql that came from files back to them.
    for template in [&parsed_config.main_query, &parsed_config.count_query] {
        if let TemplateSqlEither::TemplateSql(TemplateSql::FromFile { file, sql }) = &template.sql {
            if file.is_absolute() || file.starts_with("..") {
                return Err(WriteParsedConfigurationError::WritingOutsideDestinationDir {
                    dir: out_dir.as_ref().to_owned(),
                    file: file.clone(),
                });
            }

            let template_file = out_dir.as_ref().to_owned().join(file);
            if let Some(template_sql_dir) = template_file.parent() {
                fs::create_dir_all(template_sql_dir).await?;
            };
            fs::write(template_file, sql).await?;
        };
    }

    // create the jsonschema file
    let configuration_jsonschema_file_path = out_dir
        .as_ref()
        .to_owned()
        .join(CONFIGURATION_JSONSCHEMA_FILENAME);

    let output = schemars::schema_for!(ParsedConfiguration);
    fs::write(
        &configuration_jsonschema_file_path,
        serde_json::to_string_pretty(&output)
            .map_err(|e| WriteParsedConfigurationError::IoError(e.into()))?
            + "\n",
    )
    .await?;

    Ok(())
}
