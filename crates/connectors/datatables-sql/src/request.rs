//! Turn the query string parameters sent by a DataTables table into a `Query`.
//!
//! Parsing is lenient: a parameter that is missing or does not parse is
//! ignored. Columns are referred to by their index in the configured column list.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use query_engine_models::models;

/// The raw request parameters.
pub type RawRequest = HashMap<String, String>;

/// Runs after the request has been parsed, and may adjust the query.
pub type BuildCallback = Box<
    dyn Fn(&mut models::Query, &RawRequest, &[String]) -> Result<(), models::Error> + Send + Sync,
>;

/// Builds queries over a fixed list of columns.
pub struct QueryBuilder {
    columns: Vec<String>,
    callbacks: Vec<BuildCallback>,
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("columns", &self.columns)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl QueryBuilder {
    pub fn new(columns: Vec<String>) -> Self {
        QueryBuilder {
            columns,
            callbacks: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Register a callback. Callbacks run in registration order, after parsing.
    #[must_use]
    pub fn on_build(
        mut self,
        callback: impl Fn(&mut models::Query, &RawRequest, &[String]) -> Result<(), models::Error>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }

    pub fn build(&self, request: &RawRequest) -> Result<models::Query, models::Error> {
        let mut query = models::Query::new();
        query.set_echo(param(request, "sEcho").unwrap_or(0));

        paging(&mut query, request)?;
        self.sorting(&mut query, request)?;
        self.searching(&mut query, request)?;

        for callback in &self.callbacks {
            callback(&mut query, request, &self.columns)?;
        }

        tracing::debug!(
            echo = query.echo(),
            filters = query.filters().len(),
            sort_keys = query.order_by().len(),
            limit = ?query.limit(),
            offset = ?query.offset(),
            "Built query"
        );
        Ok(query)
    }

    fn sorting(&self, query: &mut models::Query, request: &RawRequest) -> Result<(), models::Error> {
        let sorting_columns = param::<usize>(request, "iSortingCols").unwrap_or(0);
        // never more sort keys than columns
        for i in 0..sorting_columns.min(self.columns.len()) {
            let Some(index) = param::<usize>(request, &format!("iSortCol_{i}")) else {
                continue;
            };
            if !is_true(request, &format!("bSortable_{index}")) {
                continue;
            }
            let Some(column) = self.columns.get(index) else {
                continue;
            };
            let Some(direction) = request.get(&format!("sSortDir_{i}")) else {
                continue;
            };
            if direction.parse::<models::OrderDirection>().is_err() {
                continue;
            }
            query.add_order_by(column, direction)?;
        }
        Ok(())
    }

    fn searching(&self, query: &mut models::Query, request: &RawRequest) -> Result<(), models::Error> {
        if let Some(search) = non_empty(request, "sSearch") {
            if !self.columns.is_empty() {
                query.add_filter(models::Filter::standard(
                    self.columns.iter().cloned(),
                    models::Operator::Contains,
                    search,
                )?);
            }
        }

        for (i, column) in self.columns.iter().enumerate() {
            if !is_true(request, &format!("bSearchable_{i}")) {
                continue;
            }
            if let Some(search) = non_empty(request, &format!("sSearch_{i}")) {
                query.add_filter(models::Filter::standard(
                    [column.as_str()],
                    models::Operator::Contains,
                    search,
                )?);
            }
        }
        Ok(())
    }
}

fn paging(query: &mut models::Query, request: &RawRequest) -> Result<(), models::Error> {
    let length: Option<i64> = param(request, "iDisplayLength");
    if length == Some(-1) {
        return Ok(());
    }
    if let Some(start) = param::<u64>(request, "iDisplayStart").filter(|start| *start > 0) {
        query.set_offset(Some(start));
    }
    if let Some(length) = length
        .and_then(|length| u64::try_from(length).ok())
        .filter(|length| *length > 0)
    {
        query.set_limit(Some(length))?;
    }
    Ok(())
}

fn param<T: FromStr>(request: &RawRequest, name: &str) -> Option<T> {
    request.get(name).and_then(|value| value.trim().parse().ok())
}

fn is_true(request: &RawRequest, name: &str) -> bool {
    request.get(name).is_some_and(|value| value == "true")
}

fn non_empty<'a>(request: &'a RawRequest, name: &str) -> Option<&'a str> {
    request
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}
