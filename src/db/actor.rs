use crate::db::filter::{AuthorFilter, QuoteFilter};
use crate::db::models::{DbAuthor, DbQuote, RecordKind};
use crate::db::patch::{AuthorCreate, AuthorPatch, QuoteCreate, QuotePatch};
use crate::db::patch_impl::unique_name_violation;
use crate::db::schema::{MIGRATIONS, statements};
use crate::error::QuotebookError;
use crate::patches::DbPatchable;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

type Reply<T> = RpcReplyPort<Result<T, QuotebookError>>;

#[derive(Debug)]
pub enum DbActorMessage {
    /// List authors matching every set criterion, ordered by id.
    ListAuthors(AuthorFilter, Reply<Vec<DbAuthor>>),

    GetAuthor(i64, Reply<Option<DbAuthor>>),

    /// Insert a new author and return the stored row.
    CreateAuthor(AuthorCreate, Reply<DbAuthor>),

    /// Patch an author by id; `None` when the id does not resolve.
    PatchAuthor(i64, AuthorPatch, Reply<Option<DbAuthor>>),

    /// Delete an author and its quotes in one transaction.
    DeleteAuthor(i64, Reply<bool>),

    /// List quotes matching every set criterion, ordered by id.
    ListQuotes(QuoteFilter, Reply<Vec<DbQuote>>),

    GetQuote(i64, Reply<Option<DbQuote>>),

    /// Insert a quote owned by the given author.
    CreateQuote(i64, QuoteCreate, Reply<DbQuote>),

    /// Patch a quote by id; `None` when the id does not resolve.
    PatchQuote(i64, QuotePatch, Reply<Option<DbQuote>>),

    DeleteQuote(i64, Reply<bool>),

    CountQuotes(Reply<i64>),

    SchemaVersion(Reply<i64>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

fn rpc_failed(op: &str, e: impl std::fmt::Display) -> QuotebookError {
    QuotebookError::RactorError(format!("DbActor {op} RPC failed: {e}"))
}

impl DbActorHandle {
    pub async fn list_authors(&self, filter: AuthorFilter) -> Result<Vec<DbAuthor>, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::ListAuthors, filter)
            .map_err(|e| rpc_failed("ListAuthors", e))?
    }

    pub async fn get_author(&self, id: i64) -> Result<Option<DbAuthor>, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::GetAuthor, id)
            .map_err(|e| rpc_failed("GetAuthor", e))?
    }

    pub async fn create_author(&self, create: AuthorCreate) -> Result<DbAuthor, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::CreateAuthor, create)
            .map_err(|e| rpc_failed("CreateAuthor", e))?
    }

    pub async fn patch_author(
        &self,
        id: i64,
        patch: AuthorPatch,
    ) -> Result<Option<DbAuthor>, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::PatchAuthor, id, patch)
            .map_err(|e| rpc_failed("PatchAuthor", e))?
    }

    pub async fn delete_author(&self, id: i64) -> Result<bool, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::DeleteAuthor, id)
            .map_err(|e| rpc_failed("DeleteAuthor", e))?
    }

    pub async fn list_quotes(&self, filter: QuoteFilter) -> Result<Vec<DbQuote>, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::ListQuotes, filter)
            .map_err(|e| rpc_failed("ListQuotes", e))?
    }

    pub async fn get_quote(&self, id: i64) -> Result<Option<DbQuote>, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::GetQuote, id)
            .map_err(|e| rpc_failed("GetQuote", e))?
    }

    pub async fn create_quote(
        &self,
        author_id: i64,
        create: QuoteCreate,
    ) -> Result<DbQuote, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::CreateQuote, author_id, create)
            .map_err(|e| rpc_failed("CreateQuote", e))?
    }

    pub async fn patch_quote(
        &self,
        id: i64,
        patch: QuotePatch,
    ) -> Result<Option<DbQuote>, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::PatchQuote, id, patch)
            .map_err(|e| rpc_failed("PatchQuote", e))?
    }

    pub async fn delete_quote(&self, id: i64) -> Result<bool, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::DeleteQuote, id)
            .map_err(|e| rpc_failed("DeleteQuote", e))?
    }

    pub async fn count_quotes(&self) -> Result<i64, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::CountQuotes)
            .map_err(|e| rpc_failed("CountQuotes", e))?
    }

    /// Current `PRAGMA user_version` of the open database.
    pub async fn schema_version(&self) -> Result<i64, QuotebookError> {
        ractor::call!(self.actor, DbActorMessage::SchemaVersion)
            .map_err(|e| rpc_failed("SchemaVersion", e))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // The actor handles one message at a time, so a single connection is enough
        // and keeps `sqlite::memory:` databases coherent.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_migrations(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::ListAuthors(filter, reply) => {
                let _ = reply.send(self.list_authors(pool, &filter).await);
            }
            DbActorMessage::GetAuthor(id, reply) => {
                let _ = reply.send(self.get_author(pool, id).await);
            }
            DbActorMessage::CreateAuthor(create, reply) => {
                let _ = reply.send(self.create_author(pool, create).await);
            }
            DbActorMessage::PatchAuthor(id, patch, reply) => {
                let _ = reply.send(self.patch(pool, id, &patch).await);
            }
            DbActorMessage::DeleteAuthor(id, reply) => {
                let _ = reply.send(self.delete_author(pool, id).await);
            }
            DbActorMessage::ListQuotes(filter, reply) => {
                let _ = reply.send(self.list_quotes(pool, &filter).await);
            }
            DbActorMessage::GetQuote(id, reply) => {
                let _ = reply.send(self.get_quote(pool, id).await);
            }
            DbActorMessage::CreateQuote(author_id, create, reply) => {
                let _ = reply.send(self.create_quote(pool, author_id, create).await);
            }
            DbActorMessage::PatchQuote(id, patch, reply) => {
                let _ = reply.send(self.patch(pool, id, &patch).await);
            }
            DbActorMessage::DeleteQuote(id, reply) => {
                let _ = reply.send(self.delete_quote(pool, id).await);
            }
            DbActorMessage::CountQuotes(reply) => {
                let _ = reply.send(self.count_quotes(pool).await);
            }
            DbActorMessage::SchemaVersion(reply) => {
                let _ = reply.send(schema_version(pool).await);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn list_authors(
        &self,
        pool: &SqlitePool,
        filter: &AuthorFilter,
    ) -> Result<Vec<DbAuthor>, QuotebookError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, name, surname FROM authors");
        filter.push_where(&mut qb);
        qb.push(" ORDER BY id");

        let rows = qb.build_query_as::<DbAuthor>().fetch_all(pool).await?;
        Ok(rows)
    }

    async fn get_author(
        &self,
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<DbAuthor>, QuotebookError> {
        let row = sqlx::query_as::<_, DbAuthor>(
            r#"
        SELECT id, name, surname
        FROM authors
        WHERE id = ?
        "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn create_author(
        &self,
        pool: &SqlitePool,
        create: AuthorCreate,
    ) -> Result<DbAuthor, QuotebookError> {
        let row = sqlx::query_as::<_, DbAuthor>(
            r#"
        INSERT INTO authors (name, surname)
        VALUES (?, ?)
        RETURNING id, name, surname
        "#,
        )
        .bind(create.name.as_str())
        .bind(create.surname.as_deref())
        .fetch_one(pool)
        .await
        .map_err(|e| unique_name_violation(e, Some(create.name.as_str())))?;

        debug!(table = "authors", id = row.id, "db row inserted");
        Ok(row)
    }

    /// Applies a patch inside its own transaction.
    async fn patch<P>(
        &self,
        pool: &SqlitePool,
        id: i64,
        patch: &P,
    ) -> Result<Option<P::Output>, QuotebookError>
    where
        P: DbPatchable + Sync,
        P::Output: Send,
    {
        let mut tx = pool.begin().await?;
        let row = patch.apply_patch(id, &mut *tx).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn delete_author(&self, pool: &SqlitePool, id: i64) -> Result<bool, QuotebookError> {
        let mut tx = pool.begin().await?;

        let quotes = sqlx::query("DELETE FROM quotes WHERE author_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let authors = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if authors == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        tx.commit().await?;

        debug!(table = "authors", id, cascaded_quotes = quotes, "db row deleted");
        Ok(true)
    }

    async fn list_quotes(
        &self,
        pool: &SqlitePool,
        filter: &QuoteFilter,
    ) -> Result<Vec<DbQuote>, QuotebookError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, author_id, text, rating FROM quotes");
        filter.push_where(&mut qb);
        qb.push(" ORDER BY id");

        let rows = qb.build_query_as::<DbQuote>().fetch_all(pool).await?;
        Ok(rows)
    }

    async fn get_quote(
        &self,
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<DbQuote>, QuotebookError> {
        let row = sqlx::query_as::<_, DbQuote>(
            r#"
        SELECT id, author_id, text, rating
        FROM quotes
        WHERE id = ?
        "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn create_quote(
        &self,
        pool: &SqlitePool,
        author_id: i64,
        create: QuoteCreate,
    ) -> Result<DbQuote, QuotebookError> {
        let mut tx = pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?)")
            .bind(author_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(QuotebookError::not_found(RecordKind::Author, author_id));
        }

        let row = sqlx::query_as::<_, DbQuote>(
            r#"
        INSERT INTO quotes (author_id, text, rating)
        VALUES (?, ?, ?)
        RETURNING id, author_id, text, rating
        "#,
        )
        .bind(author_id)
        .bind(create.text.as_str())
        .bind(create.rating)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(table = "quotes", id = row.id, author_id, "db row inserted");
        Ok(row)
    }

    async fn delete_quote(&self, pool: &SqlitePool, id: i64) -> Result<bool, QuotebookError> {
        let affected = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        debug!(table = "quotes", id, affected, "db row deleted");
        Ok(affected > 0)
    }

    async fn count_quotes(&self, pool: &SqlitePool) -> Result<i64, QuotebookError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, QuotebookError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| QuotebookError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn schema_version(pool: &SqlitePool) -> Result<i64, QuotebookError> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

async fn apply_migrations(pool: &SqlitePool) -> Result<(), QuotebookError> {
    let current = schema_version(pool).await?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let failed = |e: sqlx::Error| QuotebookError::MigrationError {
            version: migration.version,
            message: e.to_string(),
        };

        let mut tx = pool.begin().await.map_err(failed)?;
        for stmt in statements(migration.sql) {
            sqlx::query(stmt).execute(&mut *tx).await.map_err(failed)?;
        }
        let bump = format!("PRAGMA user_version = {}", migration.version);
        sqlx::query(&bump).execute(&mut *tx).await.map_err(failed)?;
        tx.commit().await.map_err(failed)?;

        info!(
            version = migration.version,
            description = migration.description,
            "schema migration applied"
        );
    }
    Ok(())
}
