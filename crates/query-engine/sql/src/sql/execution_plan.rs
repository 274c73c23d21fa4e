//! Describe the statements needed to answer one request.

use super::string::Statement;

/// The statements to run for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// The page of rows.
    pub results: Statement,
    /// The record count without filters.
    pub total_records: Statement,
    /// The record count with filters. Absent when the request has no filters,
    /// in which case it equals the total.
    pub filtered_records: Option<Statement>,
}

impl ExecutionPlan {
    /// Every statement of the plan, in execution order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        [Some(&self.results), Some(&self.total_records), self.filtered_records.as_ref()]
            .into_iter()
            .flatten()
    }
}
