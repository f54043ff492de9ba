//! SQL DDL for the quotebook schema.
//!
//! Migrations are append-only: a released entry is never edited, new columns
//! and tables arrive as new entries. The applied version is tracked with
//! `PRAGMA user_version`.

pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "initial authors and quotes tables",
        sql: r#"
-- ---------------------------------------------------------------------------
-- Authors (name is unique)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS authors (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name TEXT NOT NULL UNIQUE
);

-- ---------------------------------------------------------------------------
-- Quotes (owned by exactly one author)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS quotes (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
    text TEXT NOT NULL,
    rating INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_quotes_author_id ON quotes(author_id);
"#,
    },
    Migration {
        version: 2,
        description: "add author surname",
        sql: r#"
ALTER TABLE authors ADD COLUMN surname TEXT NULL;
"#,
    },
];

/// Highest schema version known to this build.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Splits a migration body into executable statements.
pub(crate) fn statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|s| {
        s.lines()
            .any(|line| !line.trim().is_empty() && !line.trim_start().starts_with("--"))
    })
}
