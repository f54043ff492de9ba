use crate::db::{AuthorQuotes, DbAuthor, DbQuote};
use crate::error::QuotebookError;
use crate::server::extract::{Criteria, JsonPayload, RecordId};
use crate::server::router::QuotebookState;
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

pub fn router() -> Router<QuotebookState> {
    Router::new()
        .route("/authors", get(list_authors).post(create_author))
        .route(
            "/authors/{id}",
            get(get_author).put(update_author).delete(delete_author),
        )
        .route(
            "/authors/{id}/quotes",
            get(author_quotes).post(create_author_quote),
        )
}

/// GET /authors
async fn list_authors(
    State(state): State<QuotebookState>,
    Criteria(criteria): Criteria,
) -> Result<Json<Vec<DbAuthor>>, QuotebookError> {
    Ok(Json(state.records.list_authors(&criteria).await?))
}

/// POST /authors
async fn create_author(
    State(state): State<QuotebookState>,
    JsonPayload(payload): JsonPayload,
) -> Result<(StatusCode, Json<DbAuthor>), QuotebookError> {
    let author = state.records.create_author(&payload).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// GET /authors/{id}
async fn get_author(
    State(state): State<QuotebookState>,
    RecordId(id): RecordId,
) -> Result<Json<DbAuthor>, QuotebookError> {
    Ok(Json(state.records.get_author(id).await?))
}

/// PUT /authors/{id}
async fn update_author(
    State(state): State<QuotebookState>,
    RecordId(id): RecordId,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<DbAuthor>, QuotebookError> {
    Ok(Json(state.records.update_author(id, &payload).await?))
}

/// DELETE /authors/{id}
///
/// Responds with the authors that remain.
async fn delete_author(
    State(state): State<QuotebookState>,
    RecordId(id): RecordId,
) -> Result<Json<Vec<DbAuthor>>, QuotebookError> {
    Ok(Json(state.records.delete_author(id).await?))
}

/// GET /authors/{id}/quotes
async fn author_quotes(
    State(state): State<QuotebookState>,
    RecordId(id): RecordId,
) -> Result<Json<AuthorQuotes>, QuotebookError> {
    Ok(Json(state.records.author_quotes(id).await?))
}

/// POST /authors/{id}/quotes
async fn create_author_quote(
    State(state): State<QuotebookState>,
    RecordId(id): RecordId,
    JsonPayload(payload): JsonPayload,
) -> Result<(StatusCode, Json<DbQuote>), QuotebookError> {
    let quote = state.records.create_quote(id, &payload).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}
