//! Request validation: field whitelists, typed payload construction and
//! query-string filters.
//!
//! Inbound JSON objects are first intersected with the set of attributes the
//! target operation recognizes; unknown keys are ignored. The typed create and
//! patch structures are then built from that intersection only.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::db::{AuthorCreate, AuthorFilter, AuthorPatch, QuoteCreate, QuoteFilter, QuotePatch};
use crate::error::QuotebookError;

pub const AUTHOR_FIELDS: &[&str] = &["name", "surname"];
pub const QUOTE_CREATE_FIELDS: &[&str] = &["text", "rating"];
pub const QUOTE_UPDATE_FIELDS: &[&str] = &["author_id", "text", "rating"];

pub const NAME_MAX_CHARS: usize = 32;
pub const TEXT_MAX_CHARS: usize = 255;
pub const DEFAULT_RATING: i64 = 1;

type Payload = Map<String, Value>;

pub fn is_rating_valid(rating: i64) -> bool {
    (1..=5).contains(&rating)
}

/// Whitelist intersection: the allowed attributes present in `payload`.
pub fn permitted_fields(payload: &Payload, allowed: &[&'static str]) -> BTreeSet<&'static str> {
    allowed
        .iter()
        .copied()
        .filter(|key| payload.contains_key(*key))
        .collect()
}

pub fn author_create(payload: &Payload) -> Result<AuthorCreate, QuotebookError> {
    let fields = permitted_fields(payload, AUTHOR_FIELDS);
    if !fields.contains("name") {
        return Err(required("name"));
    }

    let mut create = AuthorCreate {
        name: String::new(),
        surname: None,
    };
    for field in fields {
        match field {
            "name" => create.name = required_string(payload, field, NAME_MAX_CHARS)?,
            "surname" => create.surname = optional_string(payload, field, NAME_MAX_CHARS)?,
            _ => {}
        }
    }
    Ok(create)
}

pub fn author_patch(payload: &Payload) -> Result<AuthorPatch, QuotebookError> {
    let fields = permitted_fields(payload, AUTHOR_FIELDS);
    if fields.is_empty() {
        return Err(nothing_to_update());
    }

    let mut patch = AuthorPatch::default();
    for field in fields {
        match field {
            "name" => patch.name = Some(required_string(payload, field, NAME_MAX_CHARS)?),
            "surname" => patch.surname = Some(optional_string(payload, field, NAME_MAX_CHARS)?),
            _ => {}
        }
    }
    Ok(patch)
}

/// Builds a quote for insertion. An out-of-range rating falls back to
/// [`DEFAULT_RATING`] instead of rejecting the request.
pub fn quote_create(payload: &Payload) -> Result<QuoteCreate, QuotebookError> {
    let fields = permitted_fields(payload, QUOTE_CREATE_FIELDS);
    if !fields.contains("text") {
        return Err(required("text"));
    }

    let mut create = QuoteCreate {
        text: String::new(),
        rating: DEFAULT_RATING,
    };
    for field in fields {
        match field {
            "text" => create.text = required_string(payload, field, TEXT_MAX_CHARS)?,
            "rating" => {
                let rating = lax_int(payload, field)?;
                if is_rating_valid(rating) {
                    create.rating = rating;
                }
            }
            _ => {}
        }
    }
    Ok(create)
}

/// Builds a quote patch. The rating is carried as sent; stores skip it when it
/// falls outside 1..=5 (see [`QuotePatch::effective_rating`]).
pub fn quote_patch(payload: &Payload) -> Result<QuotePatch, QuotebookError> {
    let fields = permitted_fields(payload, QUOTE_UPDATE_FIELDS);
    if fields.is_empty() {
        return Err(nothing_to_update());
    }

    let mut patch = QuotePatch::default();
    for field in fields {
        match field {
            "author_id" => patch.author_id = Some(lax_int(payload, field)?),
            "text" => patch.text = Some(required_string(payload, field, TEXT_MAX_CHARS)?),
            "rating" => patch.rating = Some(lax_int(payload, field)?),
            _ => {}
        }
    }
    Ok(patch)
}

pub fn author_filter(query: &BTreeMap<String, String>) -> Result<AuthorFilter, QuotebookError> {
    let mut filter = AuthorFilter::default();
    for (key, value) in query {
        match key.as_str() {
            "id" => filter.id = Some(filter_int(key, value)?),
            "name" => filter.name = Some(value.clone()),
            "surname" => filter.surname = Some(value.clone()),
            _ => return Err(unknown_filter(key)),
        }
    }
    Ok(filter)
}

pub fn quote_filter(query: &BTreeMap<String, String>) -> Result<QuoteFilter, QuotebookError> {
    let mut filter = QuoteFilter::default();
    for (key, value) in query {
        match key.as_str() {
            "id" => filter.id = Some(filter_int(key, value)?),
            "author_id" => filter.author_id = Some(filter_int(key, value)?),
            "text" => filter.text = Some(value.clone()),
            "rating" => filter.rating = Some(filter_int(key, value)?),
            _ => return Err(unknown_filter(key)),
        }
    }
    Ok(filter)
}

fn required(field: &str) -> QuotebookError {
    QuotebookError::Validation(format!("Attribute '{field}' is required"))
}

fn nothing_to_update() -> QuotebookError {
    QuotebookError::Validation("Nothing to update".to_string())
}

fn unknown_filter(key: &str) -> QuotebookError {
    QuotebookError::Validation(format!("Unknown filter attribute '{key}'"))
}

fn required_string(payload: &Payload, field: &str, max: usize) -> Result<String, QuotebookError> {
    match optional_string(payload, field, max)? {
        Some(s) if !s.trim().is_empty() => Ok(s),
        Some(_) => Err(QuotebookError::Validation(format!(
            "Attribute '{field}' must not be empty"
        ))),
        None => Err(required(field)),
    }
}

/// `null` and a missing key both read as `None`.
fn optional_string(
    payload: &Payload,
    field: &str,
    max: usize,
) -> Result<Option<String>, QuotebookError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.chars().count() > max => Err(QuotebookError::Validation(
            format!("Attribute '{field}' must be at most {max} characters"),
        )),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(QuotebookError::Validation(format!(
            "Attribute '{field}' must be a string"
        ))),
    }
}

/// Accepts any JSON number or a string holding a decimal integer.
///
/// Whole floats such as `4.0` read as their integer value. Numbers that are
/// not a whole `i64` (`2.5`, `1e20`) read as `i64::MAX`, which lies outside
/// every rating and names no record.
fn lax_int(payload: &Payload, field: &str) -> Result<i64, QuotebookError> {
    let invalid = || QuotebookError::Validation(format!("Attribute '{field}' must be an integer"));
    match payload.get(field) {
        Some(Value::Number(n)) => Ok(n
            .as_i64()
            .or_else(|| n.as_f64().and_then(whole_f64))
            .unwrap_or(i64::MAX)),
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn whole_f64(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then(|| value as i64)
}

fn filter_int(key: &str, value: &str) -> Result<i64, QuotebookError> {
    value.trim().parse::<i64>().map_err(|_| {
        QuotebookError::Validation(format!("Filter attribute '{key}' must be an integer"))
    })
}
