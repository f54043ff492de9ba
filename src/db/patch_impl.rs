//! AuthorPatch / QuotePatch -> DbPatchable implementation.
//!
//! This sits in the `db` module because it contains SQL/table knowledge.

use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::db::{DbAuthor, DbQuote, RecordKind};
use crate::error::QuotebookError;
use crate::patches::{AuthorPatch, DbPatchable, QuotePatch};

#[async_trait]
impl DbPatchable for AuthorPatch {
    type Output = DbAuthor;

    async fn apply_patch(
        &self,
        id: i64,
        conn: &mut SqliteConnection,
    ) -> Result<Option<DbAuthor>, QuotebookError> {
        let name_set = self.name.is_some();
        let surname_set = self.surname.is_some();

        let row = sqlx::query_as::<_, DbAuthor>(
            r#"
            UPDATE authors
            SET
                name = COALESCE(?, name),
                surname = CASE WHEN ? THEN ? ELSE surname END
            WHERE id = ?
            RETURNING id, name, surname
            "#,
        )
        .bind(self.name.as_deref())
        .bind(surname_set)
        .bind(self.surname.clone().flatten())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| unique_name_violation(e, self.name.as_deref()))?;

        debug!(
            table = "authors",
            id,
            found = row.is_some(),
            name_set,
            surname_set,
            "db patch applied"
        );

        Ok(row)
    }
}

#[async_trait]
impl DbPatchable for QuotePatch {
    type Output = DbQuote;

    async fn apply_patch(
        &self,
        id: i64,
        conn: &mut SqliteConnection,
    ) -> Result<Option<DbQuote>, QuotebookError> {
        if let Some(author_id) = self.author_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?)")
                    .bind(author_id)
                    .fetch_one(&mut *conn)
                    .await?;
            if !exists {
                return Err(QuotebookError::not_found(RecordKind::Author, author_id));
            }
        }

        let rating = self.effective_rating();
        let row = sqlx::query_as::<_, DbQuote>(
            r#"
            UPDATE quotes
            SET
                author_id = COALESCE(?, author_id),
                text = COALESCE(?, text),
                rating = COALESCE(?, rating)
            WHERE id = ?
            RETURNING id, author_id, text, rating
            "#,
        )
        .bind(self.author_id)
        .bind(self.text.as_deref())
        .bind(rating)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        debug!(
            table = "quotes",
            id,
            found = row.is_some(),
            author_id_set = self.author_id.is_some(),
            text_set = self.text.is_some(),
            rating_set = rating.is_some(),
            rating_skipped = self.rating.is_some() && rating.is_none(),
            "db patch applied"
        );

        Ok(row)
    }
}

/// Maps a UNIQUE(name) violation on `authors` to a conflict error.
pub(crate) fn unique_name_violation(err: sqlx::Error, name: Option<&str>) -> QuotebookError {
    match (&err, name) {
        (sqlx::Error::Database(db_err), Some(name)) if db_err.is_unique_violation() => {
            QuotebookError::Conflict(format!("Author with name='{name}' already exists"))
        }
        _ => QuotebookError::DatabaseError(err),
    }
}
