//! SQL templates, parameterized statements and the token rewriter that turns one into the other.

pub mod sql;
