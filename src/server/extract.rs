use crate::error::QuotebookError;
use crate::utils::logging::with_pretty_json_debug;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// JSON object body of a create/update request.
///
/// - Syntax errors, a missing `content-type: application/json` and other
///   `axum::Json` rejections become a 400 carrying the rejection text.
/// - A valid JSON document that is not an object (array, string, ...) is a 400 too.
///
/// Which keys are honored is decided later by the validation layer.
pub struct JsonPayload(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = QuotebookError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await?;

        with_pretty_json_debug(&body, |pretty_body| {
            debug!(body = %pretty_body, "Extracted request body");
        });

        match body {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(QuotebookError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }
}

/// Integer `{id}` path parameter. Anything that does not parse is a 404.
#[derive(Debug, Clone, Copy)]
pub struct RecordId(pub i64);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = QuotebookError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(Self(id))
    }
}

/// Query-string filter criteria, e.g. `?rating=5&author_id=1`.
pub struct Criteria(pub BTreeMap<String, String>);

impl<S> FromRequestParts<S> for Criteria
where
    S: Send + Sync,
{
    type Rejection = QuotebookError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(criteria) = Query::<BTreeMap<String, String>>::from_request_parts(parts, state)
            .await?;
        Ok(Self(criteria))
    }
}
