//! Configuration for the data source.

use query_engine_sql::sql::template::QueryTemplate;

/// The 'Configuration' type collects all the information necessary to serve queries at runtime.
///
/// 'ParsedConfiguration' is the serialized format, with secrets and template files
/// still to be resolved. Values of this type are produced from a 'ParsedConfiguration'
/// using 'make_runtime_configuration'.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub connection_uri: String,
    pub columns: Vec<String>,
    pub main_query: QueryTemplate,
    pub count_query: QueryTemplate,
}
