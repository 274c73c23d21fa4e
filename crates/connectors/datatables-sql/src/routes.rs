//! The HTTP routes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{info_span, Instrument};

use query_engine_execution::data_source::Explain;

use crate::error::ServerError;
use crate::request::RawRequest;
use crate::response::LegacyResponse;
use crate::state::ServerState;

pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .route("/data", get(data))
        .route("/explain", get(explain))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// One page of rows for a DataTables table.
async fn data(
    State(state): State<ServerState>,
    Query(request): Query<RawRequest>,
) -> Result<Json<LegacyResponse>, ServerError> {
    async {
        let query = state.query_builder.build(&request)?;
        let results = state.data_source.get_results(&query).await?;
        Ok::<_, ServerError>(Json(LegacyResponse::from(results)))
    }
    .instrument(info_span!("Get data"))
    .await
    .map_err(|err| log_error("Query error", err))
}

/// The statements `/data` would run for the same request.
async fn explain(
    State(state): State<ServerState>,
    Query(request): Query<RawRequest>,
) -> Result<Json<Explain>, ServerError> {
    info_span!("Explain")
        .in_scope(|| -> Result<Json<Explain>, ServerError> {
            let query = state.query_builder.build(&request)?;
            Ok(Json(state.data_source.explain(&query)?))
        })
        .map_err(|err| log_error("Explain error", err))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn metrics(State(state): State<ServerState>) -> Result<String, ServerError> {
    prometheus::TextEncoder::new()
        .encode_to_string(&state.metrics_registry.gather())
        .map_err(|err| log_error("Metrics error", err.into()))
}

fn log_error(name: &str, err: ServerError) -> ServerError {
    tracing::error!(
        meta.signal_type = "log",
        event.domain = "datatables",
        event.name = name,
        name = name,
        body = %err,
        error = true,
    );
    err
}
