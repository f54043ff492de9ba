//! Record store abstraction.
//!
//! The record service only talks to [`RecordStore`]; production wires in the
//! SQLite actor handle, tests and `storage.backend = "memory"` use
//! [`MemoryStore`].

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::db::{
    AuthorCreate, AuthorFilter, AuthorPatch, DbActorHandle, DbAuthor, DbQuote, QuoteCreate,
    QuoteFilter, QuotePatch,
};
use crate::error::QuotebookError;

#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn list_authors(&self, filter: &AuthorFilter) -> Result<Vec<DbAuthor>, QuotebookError>;

    async fn get_author(&self, id: i64) -> Result<Option<DbAuthor>, QuotebookError>;

    /// Returns `Err(Conflict)` if the name is already taken.
    async fn insert_author(&self, create: AuthorCreate) -> Result<DbAuthor, QuotebookError>;

    /// Returns `None` if no author has this id.
    async fn update_author(
        &self,
        id: i64,
        patch: AuthorPatch,
    ) -> Result<Option<DbAuthor>, QuotebookError>;

    /// Removes the author and every quote it owns as one unit.
    /// Returns `true` if the author existed.
    async fn delete_author(&self, id: i64) -> Result<bool, QuotebookError>;

    async fn list_quotes(&self, filter: &QuoteFilter) -> Result<Vec<DbQuote>, QuotebookError>;

    async fn get_quote(&self, id: i64) -> Result<Option<DbQuote>, QuotebookError>;

    /// Returns `Err(NotFound)` if the author does not exist.
    async fn insert_quote(
        &self,
        author_id: i64,
        create: QuoteCreate,
    ) -> Result<DbQuote, QuotebookError>;

    /// Returns `None` if no quote has this id, `Err(NotFound)` if the patch
    /// moves the quote to a missing author.
    async fn update_quote(
        &self,
        id: i64,
        patch: QuotePatch,
    ) -> Result<Option<DbQuote>, QuotebookError>;

    async fn delete_quote(&self, id: i64) -> Result<bool, QuotebookError>;

    async fn count_quotes(&self) -> Result<i64, QuotebookError>;
}

#[async_trait]
impl RecordStore for DbActorHandle {
    async fn list_authors(&self, filter: &AuthorFilter) -> Result<Vec<DbAuthor>, QuotebookError> {
        DbActorHandle::list_authors(self, filter.clone()).await
    }

    async fn get_author(&self, id: i64) -> Result<Option<DbAuthor>, QuotebookError> {
        DbActorHandle::get_author(self, id).await
    }

    async fn insert_author(&self, create: AuthorCreate) -> Result<DbAuthor, QuotebookError> {
        self.create_author(create).await
    }

    async fn update_author(
        &self,
        id: i64,
        patch: AuthorPatch,
    ) -> Result<Option<DbAuthor>, QuotebookError> {
        self.patch_author(id, patch).await
    }

    async fn delete_author(&self, id: i64) -> Result<bool, QuotebookError> {
        DbActorHandle::delete_author(self, id).await
    }

    async fn list_quotes(&self, filter: &QuoteFilter) -> Result<Vec<DbQuote>, QuotebookError> {
        DbActorHandle::list_quotes(self, filter.clone()).await
    }

    async fn get_quote(&self, id: i64) -> Result<Option<DbQuote>, QuotebookError> {
        DbActorHandle::get_quote(self, id).await
    }

    async fn insert_quote(
        &self,
        author_id: i64,
        create: QuoteCreate,
    ) -> Result<DbQuote, QuotebookError> {
        self.create_quote(author_id, create).await
    }

    async fn update_quote(
        &self,
        id: i64,
        patch: QuotePatch,
    ) -> Result<Option<DbQuote>, QuotebookError> {
        self.patch_quote(id, patch).await
    }

    async fn delete_quote(&self, id: i64) -> Result<bool, QuotebookError> {
        DbActorHandle::delete_quote(self, id).await
    }

    async fn count_quotes(&self) -> Result<i64, QuotebookError> {
        DbActorHandle::count_quotes(self).await
    }
}

/// Builds the store selected by `storage.backend`.
pub async fn open(cfg: &StorageConfig) -> Result<Arc<dyn RecordStore>, QuotebookError> {
    match cfg.backend {
        StorageBackend::Sqlite => {
            let handle = crate::db::spawn(&cfg.database_url).await?;
            Ok(Arc::new(handle))
        }
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
