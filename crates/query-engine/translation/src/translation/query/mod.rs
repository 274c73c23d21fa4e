//! Translate an incoming `Query`.

pub mod filtering;
pub mod params;
pub mod sorting;
pub mod standard;

use query_engine_models::models;
use query_engine_sql::sql;

use crate::translation::error::Error;
use filtering::{Fragment, TranslatorRegistry};
use params::ParamNames;

/// Translate the incoming Query to an ExecutionPlan (SQL) to be run against the database.
///
/// The results statement gets every clause. The count statements get the
/// filter condition only, with any other tokens of the count template removed.
/// The filtered count is left out when the query has no filters.
pub fn translate(
    registry: &TranslatorRegistry,
    main_query: &sql::template::QueryTemplate,
    count_query: &sql::template::QueryTemplate,
    query: &models::Query,
) -> Result<sql::execution_plan::ExecutionPlan, Error> {
    // translated filter names must not shadow a name either template binds.
    let mut params = ParamNames::reserving(
        main_query
            .bind_values()
            .names()
            .chain(count_query.bind_values().names()),
    );
    let filters = filtering::translate_filters(registry, query.filters(), &mut params)?;
    let order_by = sorting::translate_order_by(query.order_by());

    let results = rewrite(
        main_query,
        filters.as_ref(),
        &Clauses {
            order_by: order_by.as_deref(),
            limit: query.limit(),
            offset: query.offset(),
        },
    )?;
    let total_records = rewrite(count_query, None, &Clauses::default())?;
    let filtered_records = match &filters {
        None => None,
        Some(filters) => Some(rewrite(count_query, Some(filters), &Clauses::default())?),
    };

    let plan = sql::execution_plan::ExecutionPlan {
        results,
        total_records,
        filtered_records,
    };
    for statement in plan.statements() {
        tracing::debug!(
            sql = %statement.sql,
            params = ?statement.params.names().collect::<Vec<_>>(),
            "Translated statement"
        );
    }
    Ok(plan)
}

#[derive(Debug, Default)]
struct Clauses<'a> {
    order_by: Option<&'a str>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// Rewrite every token family of `template`, then bind the template's own
/// values followed by the filter's.
fn rewrite(
    template: &sql::template::QueryTemplate,
    filters: Option<&Fragment>,
    clauses: &Clauses,
) -> Result<sql::string::Statement, Error> {
    let mut rewriter = template.rewriter();
    rewriter
        .set_filter_conditions(filters.map(|filters| filters.sql.as_str()))
        .set_order_by(clauses.order_by)
        .set_limit(clauses.limit)
        .set_offset(clauses.offset);

    let mut params = template.bind_values().clone();
    if let Some(filters) = filters {
        params.merge(filters.bind_values.clone())?;
    }
    Ok(sql::string::Statement {
        sql: rewriter.into_sql(),
        params,
    })
}
