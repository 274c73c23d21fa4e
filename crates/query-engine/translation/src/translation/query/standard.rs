//! The translator for standard filters.

use query_engine_models::models::{self, Operator};
use query_engine_sql::sql::helpers;
use query_engine_sql::sql::string::BindValues;

use super::filtering::{FilterTranslator, Fragment};
use super::params::{self, ParamNames};
use crate::translation::error::Error;

/// Translates standard filters into backtick-quoted column comparisons.
///
/// Each column gets the same predicate; the columns are joined with `OR`
/// and the result is parenthesized:
///
/// ```text
/// (`first_name` LIKE :p1 OR `last_name` LIKE :p1)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFilterTranslator;

impl FilterTranslator for StandardFilterTranslator {
    fn translate(
        &self,
        filter: &models::Filter,
        params: &mut ParamNames,
    ) -> Result<Fragment, Error> {
        let operator = filter.operator().ok_or_else(|| Error::UnsupportedFilter {
            translator: "StandardFilterTranslator",
            filter: filter.to_string(),
        })?;

        let base = params.next_base();
        let mut bind_values = BindValues::new();
        let predicate = match operator {
            Operator::InArray => {
                let values = filter.value().as_array().ok_or_else(|| {
                    models::Error::InvalidFilterValue {
                        operator: operator.symbol(),
                        reason: "expected a list of values".to_string(),
                    }
                })?;
                let mut names = Vec::with_capacity(values.len());
                for (index, value) in values.iter().enumerate() {
                    let name = params::derived(&base, index + 1);
                    bind_values.insert(&name, value.clone())?;
                    names.push(name);
                }
                format!("IN ({})", names.join(", "))
            }
            Operator::Contains => {
                let value = like_operand(filter.value());
                bind_values.insert(&base, format!("%{value}%").into())?;
                format!("LIKE {base}")
            }
            Operator::StartsWith => {
                let value = like_operand(filter.value());
                bind_values.insert(&base, format!("{value}%").into())?;
                format!("LIKE {base}")
            }
            Operator::EndsWith => {
                let value = like_operand(filter.value());
                bind_values.insert(&base, format!("%{value}").into())?;
                format!("LIKE {base}")
            }
            Operator::Equal
            | Operator::NotEqual
            | Operator::LowerThan
            | Operator::LowerOrEqual
            | Operator::GreaterThan
            | Operator::GreaterOrEqual => {
                bind_values.insert(&base, filter.value().clone())?;
                format!("{} {base}", operator.symbol())
            }
        };

        let conditions: Vec<String> = filter
            .columns()
            .iter()
            .map(|column| format!("{} {predicate}", helpers::quote_identifier(column)))
            .collect();

        Ok(Fragment {
            sql: format!("({})", conditions.join(" OR ")),
            bind_values,
        })
    }
}

/// The text a LIKE pattern is built from. Strings are used as they are,
/// other scalars by their JSON rendering.
fn like_operand(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(value) => value.clone(),
        serde_json::Value::Null => String::new(),
        value => value.to_string(),
    }
}
