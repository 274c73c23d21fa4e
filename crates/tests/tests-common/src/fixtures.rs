//! A small SQLite database to run queries against.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Executor, SqlitePool};

/// An in-memory database URI. Each pool connected to it gets its own database.
pub const IN_MEMORY_URI: &str = "sqlite::memory:";

/// The number of rows in `people`.
pub const PEOPLE_COUNT: u64 = 5;

const SCHEMA: &str = "
CREATE TABLE people (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    age INTEGER NOT NULL,
    score REAL,
    avatar BLOB
);
INSERT INTO people (id, name, city, age, score, avatar) VALUES
    (1, 'Ann Smith', 'Paris', 34, 4.5, x'01ff'),
    (2, 'Bob Jones', 'London', 27, 3.0, NULL),
    (3, 'Joanna Kowalska', 'Warsaw', 41, NULL, NULL),
    (4, 'Mark Annan', 'Paris', 19, 2.25, NULL),
    (5, 'Zoe Miller', 'Berlin', 52, 5.0, NULL);
";

/// A fresh in-memory database holding the `people` table.
///
/// The pool keeps a single connection for its whole life, since the
/// database disappears with the connection.
pub async fn people_database() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(IN_MEMORY_URI)
        .await?;
    pool.execute(SCHEMA).await?;
    Ok(pool)
}
