use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct DbAuthor {
    pub id: i64,
    pub name: String,
    pub surname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct DbQuote {
    pub id: i64,
    pub author_id: i64,
    pub text: String,
    pub rating: i64,
}

/// An author together with every quote it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorQuotes {
    pub author: DbAuthor,
    pub quotes: Vec<DbQuote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Author,
    Quote,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Author => f.write_str("Author"),
            RecordKind::Quote => f.write_str("Quote"),
        }
    }
}
