//! Query templates and the statements derived from them.

pub mod error;
pub mod execution_plan;
pub mod helpers;
pub mod rewrite;
pub mod string;
pub mod template;
