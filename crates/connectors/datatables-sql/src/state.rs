//! Transient state used by the server.
//!
//! This is initialized on startup.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info_span, Instrument};

use datatables_configuration::environment::Environment;
use datatables_configuration::error::{MakeRuntimeConfigurationError, ParseConfigurationError};
use datatables_configuration::Configuration;
use query_engine_execution::data_source::DataSource;
use query_engine_execution::metrics;
use query_engine_execution::sqlite::SqliteConnection;

use crate::request::QueryBuilder;

/// State for our server.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub data_source: DataSource,
    pub query_builder: Arc<QueryBuilder>,
    pub metrics_registry: prometheus::Registry,
}

/// Read the configuration directory and resolve it against the environment.
pub async fn load_configuration(
    configuration_dir: impl AsRef<Path>,
    environment: impl Environment,
) -> Result<Configuration, InitializationError> {
    let parsed = datatables_configuration::parse_configuration(configuration_dir).await?;
    Ok(datatables_configuration::make_runtime_configuration(
        parsed,
        environment,
    )?)
}

/// Create a connection pool and wrap it inside a server state.
pub async fn create_state(
    configuration: &Configuration,
    metrics_registry: &mut prometheus::Registry,
) -> Result<ServerState, InitializationError> {
    let metrics = async {
        let metrics_inner = metrics::Metrics::initialize(metrics_registry)
            .map_err(InitializationError::MetricsError)?;
        Ok::<_, InitializationError>(metrics_inner)
    }
    .instrument(info_span!("Setup metrics"))
    .await?;

    let connection = SqliteConnection::connect(&configuration.connection_uri)
        .instrument(info_span!("Create connection pool"))
        .await
        .map_err(InitializationError::UnableToCreatePool)?;

    let data_source = DataSource::builder()
        .connection(connection)
        .main_query(configuration.main_query.clone())
        .count_query(configuration.count_query.clone())
        .metrics(metrics)
        .build()
        .map_err(InitializationError::InvalidDataSource)?;

    Ok(ServerState {
        data_source,
        query_builder: Arc::new(QueryBuilder::new(configuration.columns.clone())),
        metrics_registry: metrics_registry.clone(),
    })
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("{0}")]
    ParseConfiguration(#[from] ParseConfigurationError),
    #[error("{0}")]
    MakeRuntimeConfiguration(#[from] MakeRuntimeConfigurationError),
    #[error("unable to initialize connection pool: {0}")]
    UnableToCreatePool(query_engine_execution::error::Error),
    #[error("error initializing metrics: {0}")]
    MetricsError(prometheus::Error),
    #[error("{0}")]
    InvalidDataSource(query_engine_execution::error::Error),
}
