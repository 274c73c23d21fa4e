//! The request and response types handed to and returned from the query engine.

pub mod models;
