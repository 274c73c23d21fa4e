//! Types describing a paginated, sorted and filtered request and its results.

pub mod error;
pub mod filter;
pub mod query;
pub mod results;

// re-export without modules
pub use error::Error;
pub use filter::*;
pub use query::*;
pub use results::*;
