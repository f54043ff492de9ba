use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::RecordStore;
use crate::db::{
    AuthorCreate, AuthorFilter, AuthorPatch, DbAuthor, DbQuote, QuoteCreate, QuoteFilter,
    QuotePatch, RecordKind,
};
use crate::error::QuotebookError;

#[derive(Default)]
struct Tables {
    authors: BTreeMap<i64, DbAuthor>,
    quotes: BTreeMap<i64, DbQuote>,
    last_author_id: i64,
    last_quote_id: i64,
}

impl Tables {
    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.authors
            .values()
            .any(|a| a.name == name && Some(a.id) != except)
    }
}

fn name_conflict(name: &str) -> QuotebookError {
    QuotebookError::Conflict(format!("Author with name='{name}' already exists"))
}

/// Process-local record store with the same constraints as the SQLite schema:
/// unique author names, quotes must reference an existing author, and author
/// deletion cascades to quotes. Ids are never reused.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_authors(&self, filter: &AuthorFilter) -> Result<Vec<DbAuthor>, QuotebookError> {
        let tables = self.tables.read().await;
        Ok(tables
            .authors
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }

    async fn get_author(&self, id: i64) -> Result<Option<DbAuthor>, QuotebookError> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn insert_author(&self, create: AuthorCreate) -> Result<DbAuthor, QuotebookError> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&create.name, None) {
            return Err(name_conflict(&create.name));
        }
        tables.last_author_id += 1;
        let author = DbAuthor {
            id: tables.last_author_id,
            name: create.name,
            surname: create.surname,
        };
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update_author(
        &self,
        id: i64,
        patch: AuthorPatch,
    ) -> Result<Option<DbAuthor>, QuotebookError> {
        let mut tables = self.tables.write().await;
        if let Some(name) = patch.name.as_deref().filter(|n| tables.name_taken(n, Some(id))) {
            return Err(name_conflict(name));
        }
        let Some(author) = tables.authors.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(author);
        Ok(Some(author.clone()))
    }

    async fn delete_author(&self, id: i64) -> Result<bool, QuotebookError> {
        let mut tables = self.tables.write().await;
        if tables.authors.remove(&id).is_none() {
            return Ok(false);
        }
        tables.quotes.retain(|_, q| q.author_id != id);
        Ok(true)
    }

    async fn list_quotes(&self, filter: &QuoteFilter) -> Result<Vec<DbQuote>, QuotebookError> {
        let tables = self.tables.read().await;
        Ok(tables
            .quotes
            .values()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect())
    }

    async fn get_quote(&self, id: i64) -> Result<Option<DbQuote>, QuotebookError> {
        Ok(self.tables.read().await.quotes.get(&id).cloned())
    }

    async fn insert_quote(
        &self,
        author_id: i64,
        create: QuoteCreate,
    ) -> Result<DbQuote, QuotebookError> {
        let mut tables = self.tables.write().await;
        if !tables.authors.contains_key(&author_id) {
            return Err(QuotebookError::not_found(RecordKind::Author, author_id));
        }
        tables.last_quote_id += 1;
        let quote = DbQuote {
            id: tables.last_quote_id,
            author_id,
            text: create.text,
            rating: create.rating,
        };
        tables.quotes.insert(quote.id, quote.clone());
        Ok(quote)
    }

    async fn update_quote(
        &self,
        id: i64,
        patch: QuotePatch,
    ) -> Result<Option<DbQuote>, QuotebookError> {
        let mut tables = self.tables.write().await;
        if let Some(author_id) = patch
            .author_id
            .filter(|aid| !tables.authors.contains_key(aid))
        {
            return Err(QuotebookError::not_found(RecordKind::Author, author_id));
        }
        let Some(quote) = tables.quotes.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(quote);
        Ok(Some(quote.clone()))
    }

    async fn delete_quote(&self, id: i64) -> Result<bool, QuotebookError> {
        Ok(self.tables.write().await.quotes.remove(&id).is_some())
    }

    async fn count_quotes(&self) -> Result<i64, QuotebookError> {
        let count = self.tables.read().await.quotes.len();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}
