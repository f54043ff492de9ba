//! Crate-private partial-update types shared by both record stores.
//!
//! The `db` module re-exports these so external paths remain stable
//! (e.g. `quotebook::db::AuthorPatch`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::db::{DbAuthor, DbQuote};
use crate::error::QuotebookError;
use crate::validation::is_rating_valid;

/// Abstraction for applying a patch to one row inside an open SQLite connection
/// (usually a transaction owned by the database actor).
///
/// Returns `Ok(None)` when no row has the given id.
#[async_trait]
pub trait DbPatchable {
    type Output;

    async fn apply_patch(
        &self,
        id: i64,
        conn: &mut SqliteConnection,
    ) -> Result<Option<Self::Output>, QuotebookError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorPatch {
    /// `None` => do not change; `Some(v)` => update
    pub name: Option<String>,
    /// `None` => do not change; `Some(None)` => clear; `Some(Some(v))` => update
    pub surname: Option<Option<String>>,
}

impl AuthorPatch {
    pub fn apply_to(&self, author: &mut DbAuthor) {
        if let Some(name) = &self.name {
            author.name.clone_from(name);
        }
        if let Some(surname) = &self.surname {
            author.surname.clone_from(surname);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePatch {
    /// `None` => do not change; `Some(v)` => move the quote to author `v`
    pub author_id: Option<i64>,
    pub text: Option<String>,
    /// Only ratings within 1..=5 are ever applied.
    pub rating: Option<i64>,
}

impl QuotePatch {
    /// Rating to persist, if any.
    pub fn effective_rating(&self) -> Option<i64> {
        self.rating.filter(|r| is_rating_valid(*r))
    }

    pub fn apply_to(&self, quote: &mut DbQuote) {
        if let Some(author_id) = self.author_id {
            quote.author_id = author_id;
        }
        if let Some(text) = &self.text {
            quote.text.clone_from(text);
        }
        if let Some(rating) = self.effective_rating() {
            quote.rating = rating;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_patch_clears_surname_only_when_requested() {
        let mut author = DbAuthor {
            id: 1,
            name: "Rick".to_string(),
            surname: Some("Cook".to_string()),
        };

        AuthorPatch {
            name: Some("Richard".to_string()),
            surname: None,
        }
        .apply_to(&mut author);
        assert_eq!(author.name, "Richard");
        assert_eq!(author.surname.as_deref(), Some("Cook"));

        AuthorPatch {
            name: None,
            surname: Some(None),
        }
        .apply_to(&mut author);
        assert_eq!(author.surname, None);
    }

    #[test]
    fn quote_patch_never_applies_out_of_range_rating() {
        let mut quote = DbQuote {
            id: 1,
            author_id: 1,
            text: "old".to_string(),
            rating: 3,
        };
        QuotePatch {
            author_id: None,
            text: Some("new".to_string()),
            rating: Some(42),
        }
        .apply_to(&mut quote);
        assert_eq!(quote.text, "new");
        assert_eq!(quote.rating, 3);
    }
}
