//! Convert a parsed configuration into the one used at runtime.

use query_engine_sql::sql::string::BindValues;
use query_engine_sql::sql::template::QueryTemplate;

use crate::configuration::Configuration;
use crate::environment::Environment;
use crate::error::MakeRuntimeConfigurationError;
use crate::version1::{ParsedConfiguration, TemplateConfiguration};

/// Resolve secrets and build the query templates.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    let connection_uri = parsed_config.connection_uri.resolve(&environment)?;
    Ok(Configuration {
        connection_uri,
        columns: parsed_config.columns,
        main_query: make_template("mainQuery", &parsed_config.main_query)?,
        count_query: make_template("countQuery", &parsed_config.count_query)?,
    })
}

fn make_template(
    name: &'static str,
    template: &TemplateConfiguration,
) -> Result<QueryTemplate, MakeRuntimeConfigurationError> {
    let invalid = |message: String| MakeRuntimeConfigurationError::InvalidTemplate {
        template: name,
        message,
    };
    let sql = template.sql.sql().map_err(invalid)?;
    let bind_values = BindValues::try_from_iter(
        template
            .bind_values
            .iter()
            .map(|(name, value)| (name, value.clone())),
    )
    .map_err(|err| invalid(err.to_string()))?;
    QueryTemplate::new(sql, bind_values).map_err(|err| invalid(err.to_string()))
}
