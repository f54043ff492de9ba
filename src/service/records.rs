use rand::seq::IndexedRandom;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::{AuthorQuotes, DbAuthor, DbQuote, QuoteFilter, RecordKind};
use crate::error::QuotebookError;
use crate::store::RecordStore;
use crate::validation;

/// CRUD over authors and quotes, composed from validation and store calls.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list_authors(
        &self,
        query: &BTreeMap<String, String>,
    ) -> Result<Vec<DbAuthor>, QuotebookError> {
        let filter = validation::author_filter(query)?;
        self.store.list_authors(&filter).await
    }

    pub async fn get_author(&self, id: i64) -> Result<DbAuthor, QuotebookError> {
        self.store
            .get_author(id)
            .await?
            .ok_or_else(|| QuotebookError::not_found(RecordKind::Author, id))
    }

    pub async fn create_author(
        &self,
        payload: &Map<String, Value>,
    ) -> Result<DbAuthor, QuotebookError> {
        let create = validation::author_create(payload)?;
        let author = self.store.insert_author(create).await?;
        info!(id = author.id, name = %author.name, "author created");
        Ok(author)
    }

    pub async fn update_author(
        &self,
        id: i64,
        payload: &Map<String, Value>,
    ) -> Result<DbAuthor, QuotebookError> {
        self.get_author(id).await?;
        let patch = validation::author_patch(payload)?;
        self.store
            .update_author(id, patch)
            .await?
            .ok_or_else(|| QuotebookError::not_found(RecordKind::Author, id))
    }

    /// Deletes the author together with its quotes and returns the remaining authors.
    pub async fn delete_author(&self, id: i64) -> Result<Vec<DbAuthor>, QuotebookError> {
        if !self.store.delete_author(id).await? {
            return Err(QuotebookError::not_found(RecordKind::Author, id));
        }
        info!(id, "author deleted");
        self.store.list_authors(&Default::default()).await
    }

    pub async fn author_quotes(&self, id: i64) -> Result<AuthorQuotes, QuotebookError> {
        let author = self.get_author(id).await?;
        let filter = QuoteFilter {
            author_id: Some(id),
            ..Default::default()
        };
        let quotes = self.store.list_quotes(&filter).await?;
        Ok(AuthorQuotes { author, quotes })
    }

    pub async fn create_quote(
        &self,
        author_id: i64,
        payload: &Map<String, Value>,
    ) -> Result<DbQuote, QuotebookError> {
        self.get_author(author_id).await?;
        let create = validation::quote_create(payload)?;
        let quote = self.store.insert_quote(author_id, create).await?;
        info!(id = quote.id, author_id, rating = quote.rating, "quote created");
        Ok(quote)
    }

    pub async fn list_quotes(
        &self,
        query: &BTreeMap<String, String>,
    ) -> Result<Vec<DbQuote>, QuotebookError> {
        let filter = validation::quote_filter(query)?;
        self.store.list_quotes(&filter).await
    }

    pub async fn get_quote(&self, id: i64) -> Result<DbQuote, QuotebookError> {
        self.store
            .get_quote(id)
            .await?
            .ok_or_else(|| QuotebookError::not_found(RecordKind::Quote, id))
    }

    pub async fn update_quote(
        &self,
        id: i64,
        payload: &Map<String, Value>,
    ) -> Result<DbQuote, QuotebookError> {
        self.get_quote(id).await?;
        let patch = validation::quote_patch(payload)?;
        if patch.rating.is_some() && patch.effective_rating().is_none() {
            debug!(id, rating = ?patch.rating, "out-of-range rating skipped");
        }
        self.store
            .update_quote(id, patch)
            .await?
            .ok_or_else(|| QuotebookError::not_found(RecordKind::Quote, id))
    }

    /// Deletes the quote and returns the remaining quotes.
    pub async fn delete_quote(&self, id: i64) -> Result<Vec<DbQuote>, QuotebookError> {
        if !self.store.delete_quote(id).await? {
            return Err(QuotebookError::not_found(RecordKind::Quote, id));
        }
        info!(id, "quote deleted");
        self.store.list_quotes(&QuoteFilter::default()).await
    }

    pub async fn count_quotes(&self) -> Result<i64, QuotebookError> {
        self.store.count_quotes().await
    }

    pub async fn random_quote(&self) -> Result<DbQuote, QuotebookError> {
        let quotes = self.store.list_quotes(&QuoteFilter::default()).await?;
        quotes
            .choose(&mut rand::rng())
            .cloned()
            .ok_or_else(|| QuotebookError::NotFound("No quotes available".to_string()))
    }
}
