//! The database capability a data source runs its statements against.

use std::sync::Arc;

use async_trait::async_trait;

use query_engine_models::models;
use query_engine_sql::sql::string::Statement;

use crate::error::Error;

/// Prepare a statement, bind its named parameters and fetch the rows.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Every row the statement returns, in order.
    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<models::Row>, Error>;

    /// The first row the statement returns, if any.
    async fn fetch_optional(&self, statement: &Statement) -> Result<Option<models::Row>, Error>;
}

#[async_trait]
impl<C: Connection + ?Sized> Connection for Arc<C> {
    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<models::Row>, Error> {
        (**self).fetch_all(statement).await
    }

    async fn fetch_optional(&self, statement: &Statement) -> Result<Option<models::Row>, Error> {
        (**self).fetch_optional(statement).await
    }
}
