//! Query execution against a SQL database.

pub mod connection;
pub mod data_source;
pub mod error;
pub mod metrics;
pub mod params;
pub mod sqlite;
