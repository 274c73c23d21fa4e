//! The response format the legacy DataTables client expects.

use serde::{Deserialize, Serialize};

use query_engine_models::models;

/// `Results` under the names DataTables reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyResponse {
    #[serde(rename = "sEcho")]
    pub echo: i64,
    #[serde(rename = "iTotalRecords")]
    pub total_records: u64,
    #[serde(rename = "iTotalDisplayRecords")]
    pub total_display_records: u64,
    #[serde(rename = "aaData")]
    pub data: Vec<models::Row>,
}

impl From<models::Results> for LegacyResponse {
    fn from(results: models::Results) -> Self {
        LegacyResponse {
            echo: results.echo(),
            total_records: results.total_records(),
            total_display_records: results.total_display_records(),
            data: results.into_data(),
        }
    }
}
