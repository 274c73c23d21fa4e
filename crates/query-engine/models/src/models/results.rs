//! The result envelope of a request.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single result row, in column order.
pub type Row = IndexMap<String, serde_json::Value>;

/// The rows of one page together with the total and filtered record counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    echo: i64,
    total_records: u64,
    total_display_records: u64,
    data: Vec<Row>,
}

impl Results {
    pub fn new(echo: i64, total_records: u64, total_display_records: u64, data: Vec<Row>) -> Self {
        Results {
            echo,
            total_records,
            total_display_records,
            data,
        }
    }

    pub fn echo(&self) -> i64 {
        self.echo
    }

    /// The number of records before filtering.
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    /// The number of records after filtering.
    pub fn total_display_records(&self) -> u64 {
        self.total_display_records
    }

    pub fn data(&self) -> &[Row] {
        &self.data
    }

    pub fn into_data(self) -> Vec<Row> {
        self.data
    }
}
