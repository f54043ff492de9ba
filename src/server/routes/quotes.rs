use crate::db::DbQuote;
use crate::error::QuotebookError;
use crate::server::extract::{Criteria, JsonPayload, RecordId};
use crate::server::router::QuotebookState;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

pub fn router() -> Router<QuotebookState> {
    Router::new()
        .route("/quotes", get(list_quotes))
        .route("/quotes/count", get(count_quotes))
        .route("/quotes/random", get(random_quote))
        .route(
            "/quotes/{id}",
            get(get_quote).put(update_quote).delete(delete_quote),
        )
}

#[derive(Debug, Serialize)]
pub struct QuoteCount {
    pub count: i64,
}

/// GET /quotes
///
/// Every query parameter is an equality criterion; all of them must match.
async fn list_quotes(
    State(state): State<QuotebookState>,
    Criteria(criteria): Criteria,
) -> Result<Json<Vec<DbQuote>>, QuotebookError> {
    Ok(Json(state.records.list_quotes(&criteria).await?))
}

/// GET /quotes/count
async fn count_quotes(
    State(state): State<QuotebookState>,
) -> Result<Json<QuoteCount>, QuotebookError> {
    let count = state.records.count_quotes().await?;
    Ok(Json(QuoteCount { count }))
}

/// GET /quotes/random
///
/// 404 when there are no quotes.
async fn random_quote(State(state): State<QuotebookState>) -> Result<Json<DbQuote>, QuotebookError> {
    Ok(Json(state.records.random_quote().await?))
}

/// GET /quotes/{id}
async fn get_quote(
    State(state): State<QuotebookState>,
    RecordId(id): RecordId,
) -> Result<Json<DbQuote>, QuotebookError> {
    Ok(Json(state.records.get_quote(id).await?))
}

/// PUT /quotes/{id}
///
/// An out-of-range `rating` is skipped; the other fields still apply.
async fn update_quote(
    State(state): State<QuotebookState>,
    RecordId(id): RecordId,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<DbQuote>, QuotebookError> {
    Ok(Json(state.records.update_quote(id, &payload).await?))
}

/// DELETE /quotes/{id}
async fn delete_quote(
    State(state): State<QuotebookState>,
    RecordId(id): RecordId,
) -> Result<Json<Vec<DbQuote>>, QuotebookError> {
    Ok(Json(state.records.delete_quote(id).await?))
}
