//! Answer requests against a pair of query templates.
//!
//! A data source owns the main query template, the count query template,
//! the filter translators and the connection. Every call translates the
//! request into up to three statements (see
//! `query_engine_translation::translation::query::translate`), runs them and
//! assembles the results. Nothing is kept between calls.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info_span, Instrument};

use query_engine_models::models;
use query_engine_sql::sql;
use query_engine_translation::translation;
use query_engine_translation::translation::query::filtering::TranslatorRegistry;

use crate::connection::Connection;
use crate::error::Error;
use crate::metrics::Metrics;

/// Collects the parts of a data source. `build` checks that none is missing.
///
/// Starts with the standard filter translator registered.
pub struct DataSourceBuilder {
    connection: Option<Arc<dyn Connection>>,
    translators: TranslatorRegistry,
    main_query: Option<sql::template::QueryTemplate>,
    count_query: Option<sql::template::QueryTemplate>,
    metrics: Option<Metrics>,
}

impl DataSourceBuilder {
    pub fn new() -> Self {
        DataSourceBuilder {
            connection: None,
            translators: TranslatorRegistry::standard(),
            main_query: None,
            count_query: None,
            metrics: None,
        }
    }

    #[must_use]
    pub fn connection(self, connection: impl Connection + 'static) -> Self {
        self.shared_connection(Arc::new(connection))
    }

    #[must_use]
    pub fn shared_connection(mut self, connection: Arc<dyn Connection>) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Replace the filter translators.
    #[must_use]
    pub fn translators(mut self, translators: TranslatorRegistry) -> Self {
        self.translators = translators;
        self
    }

    /// The query returning the rows.
    #[must_use]
    pub fn main_query(mut self, template: sql::template::QueryTemplate) -> Self {
        self.main_query = Some(template);
        self
    }

    /// The query returning the number of rows, as a single value.
    #[must_use]
    pub fn count_query(mut self, template: sql::template::QueryTemplate) -> Self {
        self.count_query = Some(template);
        self
    }

    #[must_use]
    pub fn metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<DataSource, Error> {
        let connection = self
            .connection
            .ok_or_else(|| Error::InvalidDataSource("Connection is not set".to_string()))?;
        if self.translators.is_empty() {
            return Err(Error::InvalidDataSource(
                "No filter translators are registered".to_string(),
            ));
        }
        let main_query = self
            .main_query
            .ok_or_else(|| Error::InvalidDataSource("Main query is not set".to_string()))?;
        let count_query = self
            .count_query
            .ok_or_else(|| Error::InvalidDataSource("Count query is not set".to_string()))?;
        Ok(DataSource {
            connection,
            translators: self.translators,
            main_query,
            count_query,
            metrics: self.metrics,
        })
    }
}

impl Default for DataSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Answers requests against a main query and a count query.
#[derive(Clone)]
pub struct DataSource {
    connection: Arc<dyn Connection>,
    translators: TranslatorRegistry,
    main_query: sql::template::QueryTemplate,
    count_query: sql::template::QueryTemplate,
    metrics: Option<Metrics>,
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("translators", &self.translators)
            .field("main_query", &self.main_query)
            .field("count_query", &self.count_query)
            .finish_non_exhaustive()
    }
}

/// The statements a request would run, formatted for reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explain {
    pub results: ExplainedStatement,
    pub total_records: ExplainedStatement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_records: Option<ExplainedStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedStatement {
    pub sql: String,
    pub params: sql::string::BindValues,
}

impl DataSource {
    pub fn builder() -> DataSourceBuilder {
        DataSourceBuilder::new()
    }

    /// Fetch one page of rows, with the total and filtered record counts.
    pub async fn get_results(&self, query: &models::Query) -> Result<models::Results, Error> {
        let result = self.fetch_results(query).await;
        if let (Err(_), Some(metrics)) = (&result, &self.metrics) {
            metrics.error_metrics();
        }
        result
    }

    /// The statements `get_results` would run for `query`, without running them.
    pub fn explain(&self, query: &models::Query) -> Result<Explain, Error> {
        let result = self.plan(query).map(|plan| Explain {
            results: explain_statement(plan.results),
            total_records: explain_statement(plan.total_records),
            filtered_records: plan.filtered_records.map(explain_statement),
        });
        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(_) => metrics.record_successful_explain(),
                Err(_) => metrics.error_metrics(),
            }
        }
        result
    }

    fn plan(&self, query: &models::Query) -> Result<sql::execution_plan::ExecutionPlan, Error> {
        let plan = info_span!("Translate query").in_scope(|| {
            translation::query::translate(
                &self.translators,
                &self.main_query,
                &self.count_query,
                query,
            )
        })?;
        Ok(plan)
    }

    async fn fetch_results(&self, query: &models::Query) -> Result<models::Results, Error> {
        let plan = self.plan(query)?;

        let filtered_records = async {
            match &plan.filtered_records {
                None => Ok(None),
                Some(statement) => self.fetch_count(statement).await.map(Some),
            }
        };
        let (data, total_records, filtered_records) = tokio::try_join!(
            self.connection
                .fetch_all(&plan.results)
                .instrument(info_span!("Fetch results")),
            self.fetch_count(&plan.total_records)
                .instrument(info_span!("Fetch total records")),
            filtered_records.instrument(info_span!("Fetch filtered records")),
        )?;

        if let Some(metrics) = &self.metrics {
            let statements = plan.statements().count() as u64;
            metrics.record_successful_query(statements, plan.filtered_records.is_none());
        }

        Ok(models::Results::new(
            query.echo(),
            total_records,
            filtered_records.unwrap_or(total_records),
            data,
        ))
    }

    async fn fetch_count(&self, statement: &sql::string::Statement) -> Result<u64, Error> {
        let row = self
            .connection
            .fetch_optional(statement)
            .await?
            .ok_or_else(|| {
                Error::UnexpectedValue(format!("count query returned no row: {}", statement.sql))
            })?;
        let (_, value) = row.first().ok_or_else(|| {
            Error::UnexpectedValue(format!(
                "count query returned a row without columns: {}",
                statement.sql
            ))
        })?;
        parse_count(value)
    }
}

/// A record count is a non-negative integer, possibly held in a string.
fn parse_count(value: &serde_json::Value) -> Result<u64, Error> {
    match value {
        serde_json::Value::Number(number) => number.as_u64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::UnexpectedValue(format!("expected a record count, got {value}")))
}

fn explain_statement(statement: sql::string::Statement) -> ExplainedStatement {
    ExplainedStatement {
        sql: sqlformat::format(
            &statement.sql,
            &sqlformat::QueryParams::None,
            sqlformat::FormatOptions::default(),
        ),
        params: statement.params,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;

    /// Records every statement and answers with canned rows.
    #[derive(Default)]
    struct Recording {
        statements: Mutex<Vec<String>>,
        rows: Vec<models::Row>,
        counts: Mutex<VecDeque<serde_json::Value>>,
    }

    impl Recording {
        fn new(rows: Vec<models::Row>, counts: impl IntoIterator<Item = serde_json::Value>) -> Self {
            Recording {
                statements: Mutex::default(),
                rows,
                counts: Mutex::new(counts.into_iter().collect()),
            }
        }

        fn statements(&self) -> Vec<String> {
            let mut statements = self.statements.lock().unwrap().clone();
            statements.sort();
            statements
        }
    }

    #[async_trait]
    impl Connection for Recording {
        async fn fetch_all(
            &self,
            statement: &sql::string::Statement,
        ) -> Result<Vec<models::Row>, Error> {
            self.statements.lock().unwrap().push(statement.sql.clone());
            Ok(self.rows.clone())
        }

        async fn fetch_optional(
            &self,
            statement: &sql::string::Statement,
        ) -> Result<Option<models::Row>, Error> {
            self.statements.lock().unwrap().push(statement.sql.clone());
            let count = self.counts.lock().unwrap().pop_front();
            Ok(count.map(|count| models::Row::from([("count".to_string(), count)])))
        }
    }

    fn row(name: &str) -> models::Row {
        models::Row::from([("name".to_string(), json!(name))])
    }

    fn data_source(connection: Arc<Recording>) -> DataSource {
        DataSource::builder()
            .shared_connection(connection)
            .main_query("SELECT * FROM t [where]".parse().unwrap())
            .count_query("SELECT COUNT(*) FROM t [where]".parse().unwrap())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn without_filters_only_two_statements_run() {
        let connection = Arc::new(Recording::new(vec![row("ann"), row("bob")], [json!(2)]));
        let mut registry = prometheus::Registry::new();
        let metrics = Metrics::initialize(&mut registry).unwrap();
        let data_source = DataSource::builder()
            .shared_connection(connection.clone())
            .main_query("SELECT * FROM t [where]".parse().unwrap())
            .count_query("SELECT COUNT(*) FROM t [where]".parse().unwrap())
            .metrics(metrics.clone())
            .build()
            .unwrap();

        let mut query = models::Query::new();
        query.set_echo(7);
        let results = data_source.get_results(&query).await.unwrap();

        assert_eq!(
            results,
            models::Results::new(7, 2, 2, vec![row("ann"), row("bob")])
        );
        assert_eq!(
            connection.statements(),
            vec!["SELECT * FROM t ", "SELECT COUNT(*) FROM t "]
        );
        assert_eq!(metrics.statement_total.get(), 2);
        assert_eq!(metrics.filtered_count_skipped_total.get(), 1);
        assert_eq!(metrics.query_total.get(), 1);
    }

    #[tokio::test]
    async fn with_filters_the_filtered_count_runs() {
        let connection = Arc::new(Recording::new(vec![row("ann")], [json!(10), json!("1")]));
        let data_source = data_source(connection.clone());

        let mut query = models::Query::new();
        query.add_filter(
            models::Filter::standard(["name"], models::Operator::Contains, "ann").unwrap(),
        );
        let results = data_source.get_results(&query).await.unwrap();

        assert_eq!(results.data(), &[row("ann")]);
        // both counts come from the same canned queue, whichever statement asks first.
        let mut counts = vec![results.total_records(), results.total_display_records()];
        counts.sort_unstable();
        assert_eq!(counts, vec![1, 10]);
        assert_eq!(
            connection.statements(),
            vec![
                "SELECT * FROM t WHERE (`name` LIKE :p1)",
                "SELECT COUNT(*) FROM t ",
                "SELECT COUNT(*) FROM t WHERE (`name` LIKE :p1)",
            ]
        );
    }

    #[tokio::test]
    async fn missing_count_row_is_unexpected() {
        let connection = Arc::new(Recording::new(vec![], []));
        let err = data_source(connection)
            .get_results(&models::Query::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedValue(_)), "{err:?}");
    }

    #[tokio::test]
    async fn non_numeric_count_is_unexpected() {
        let connection = Arc::new(Recording::new(vec![], [json!("many")]));
        let err = data_source(connection)
            .get_results(&models::Query::new())
            .await
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @r#"Unexpected value: expected a record count, got "many""#);
    }

    #[tokio::test]
    async fn unknown_filters_abort_the_call() {
        let connection = Arc::new(Recording::new(vec![row("ann")], [json!(1), json!(1)]));
        let data_source = data_source(connection.clone());
        let mut query = models::Query::new();
        query.add_filter(models::Filter::custom("geo", ["location"], json!("near")).unwrap());

        let err = data_source.get_results(&query).await.unwrap_err();

        assert!(err.is_translator_not_found(), "{err:?}");
        assert!(connection.statements().is_empty());
    }

    #[test]
    fn every_part_is_required() {
        let template: sql::template::QueryTemplate = "SELECT 1".parse().unwrap();
        let connection = || Recording::new(vec![], []);
        let cases = [
            (
                DataSource::builder()
                    .main_query(template.clone())
                    .count_query(template.clone()),
                "Connection is not set",
            ),
            (
                DataSource::builder()
                    .connection(connection())
                    .translators(TranslatorRegistry::empty())
                    .main_query(template.clone())
                    .count_query(template.clone()),
                "No filter translators are registered",
            ),
            (
                DataSource::builder()
                    .connection(connection())
                    .count_query(template.clone()),
                "Main query is not set",
            ),
            (
                DataSource::builder()
                    .connection(connection())
                    .main_query(template.clone()),
                "Count query is not set",
            ),
        ];
        for (builder, message) in cases {
            match builder.build() {
                Err(Error::InvalidDataSource(actual)) => assert_eq!(actual, message),
                other => panic!("expected an invalid data source, got {other:?}"),
            }
        }
    }

    #[test]
    fn explain_lists_the_statements_without_running_them() {
        let connection = Arc::new(Recording::new(vec![], []));
        let data_source = data_source(connection.clone());
        let mut query = models::Query::new();
        query
            .add_filter(models::Filter::standard(["age"], models::Operator::GreaterThan, 30).unwrap())
            .set_limit(Some(5))
            .unwrap();

        let explain = data_source.explain(&query).unwrap();

        assert!(connection.statements().is_empty());
        assert_eq!(
            explain.results.sql,
            sqlformat::format(
                "SELECT * FROM t WHERE (`age` > :p1) LIMIT 5",
                &sqlformat::QueryParams::None,
                sqlformat::FormatOptions::default(),
            )
        );
        assert_eq!(explain.results.params.get(":p1"), Some(&json!(30)));
        assert!(explain.filtered_records.is_some());
        let serialized = serde_json::to_value(&explain).unwrap();
        assert_eq!(serialized["results"]["params"], json!({":p1": 30}));
        assert!(serialized.get("totalRecords").is_some());
    }

    #[test]
    fn counts_may_be_strings() {
        assert_eq!(parse_count(&json!(3)).unwrap(), 3);
        assert_eq!(parse_count(&json!(" 42 ")).unwrap(), 42);
        assert!(parse_count(&json!(-1)).is_err());
        assert!(parse_count(&json!(null)).is_err());
    }
}
