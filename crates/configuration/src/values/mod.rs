mod secret;
pub mod template_sql;
pub mod uri;

pub use secret::Secret;
pub use template_sql::{TemplateSql, TemplateSqlEither, TemplateSqlExternal};
pub use uri::ConnectionUri;
