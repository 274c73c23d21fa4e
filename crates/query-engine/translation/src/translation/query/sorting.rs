//! Handle ORDER BY clause translation.

use query_engine_models::models;
use query_engine_sql::sql::helpers;

/// Render the sort keys as an ORDER BY list, in request order.
/// `None` when there is nothing to sort by.
pub fn translate_order_by(order_by: &[models::OrderByElement]) -> Option<String> {
    if order_by.is_empty() {
        return None;
    }
    let elements: Vec<String> = order_by
        .iter()
        .map(|element| {
            format!(
                "{} {}",
                helpers::quote_identifier(&element.column),
                element.direction
            )
        })
        .collect();
    Some(elements.join(", "))
}
