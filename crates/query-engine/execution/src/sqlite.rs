//! A connection to a SQLite database.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

use query_engine_models::models;
use query_engine_sql::sql::string::Statement;

use crate::connection::Connection;
use crate::error::Error;
use crate::params;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Runs statements on a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    /// Connect to the database at `uri`, e.g. `sqlite://data.db` or `sqlite::memory:`.
    ///
    /// An in-memory database lives as long as its connection, so it is
    /// served by a single connection that is never recycled.
    pub async fn connect(uri: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(uri)?;
        let pool_options = if is_in_memory(uri) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        SqliteConnection { pool }
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<models::Row>, Error> {
        let positional = params::to_positional(statement)?;
        let query = bind_values(sqlx::query(&positional.sql), &positional.values)?;
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn fetch_optional(&self, statement: &Statement) -> Result<Option<models::Row>, Error> {
        let positional = params::to_positional(statement)?;
        let query = bind_values(sqlx::query(&positional.sql), &positional.values)?;
        let row = query.fetch_optional(&self.pool).await?;
        row.as_ref().map(decode_row).transpose()
    }
}

fn is_in_memory(uri: &str) -> bool {
    uri.contains(":memory:") || uri.contains("mode=memory")
}

/// Bind our parameters to a SQLx query, in order.
fn bind_values<'q>(
    query: SqliteQuery<'q>,
    values: &[serde_json::Value],
) -> Result<SqliteQuery<'q>, Error> {
    values
        .iter()
        .try_fold(query, |query, value| match value {
            serde_json::Value::Null => Ok(query.bind(None::<String>)),
            serde_json::Value::Bool(value) => Ok(query.bind(*value)),
            serde_json::Value::Number(number) => match (number.as_i64(), number.as_f64()) {
                (Some(integer), _) => Ok(query.bind(integer)),
                (None, Some(float)) => Ok(query.bind(float)),
                (None, None) => Err(Error::InvalidArgument(format!(
                    "number {number} cannot be bound"
                ))),
            },
            serde_json::Value::String(value) => Ok(query.bind(value.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
                Error::InvalidArgument(format!("value {value} cannot be bound")),
            ),
        })
}

/// Convert a SQLite row to column name => JSON value, by the storage class of each value.
fn decode_row(row: &SqliteRow) -> Result<models::Row, Error> {
    let mut decoded = models::Row::with_capacity(row.len());
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            serde_json::Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => serde_json::Value::from(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" => serde_json::Value::from(row.try_get_unchecked::<f64, _>(index)?),
                "BLOB" => serde_json::Value::from(row.try_get_unchecked::<Vec<u8>, _>(index)?),
                _ => serde_json::Value::from(row.try_get_unchecked::<String, _>(index)?),
            }
        };
        decoded.insert(column.name().to_string(), value);
    }
    Ok(decoded)
}
