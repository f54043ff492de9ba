use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use quotebook::server::{QuotebookState, quotebook_router};
use quotebook::service::RecordService;
use quotebook::store::{MemoryStore, RecordStore};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

fn app_with(store: Arc<dyn RecordStore>) -> Router {
    quotebook_router(QuotebookState::new(
        RecordService::new(store),
        Arc::from("About quotebook"),
    ))
}

fn memory_app() -> Router {
    app_with(Arc::new(MemoryStore::new()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, value)
}

async fn send_raw(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let value = serde_json::from_slice(&bytes).expect("response body is not JSON");
    (status, value)
}

async fn seed_author(app: &Router, name: &str) -> i64 {
    let (status, body) = send(app, "POST", "/authors", Some(json!({"name": name}))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn seed_quote(app: &Router, author_id: i64, text: &str, rating: i64) -> Value {
    let (status, body) = send(
        app,
        "POST",
        &format!("/authors/{author_id}/quotes"),
        Some(json!({"text": text, "rating": rating})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

/// Walks the documented example against a real SQLite file: an out-of-range
/// rating on create falls back to the default rating of 1.
#[tokio::test]
async fn quote_create_with_out_of_range_rating_defaults_to_one_on_sqlite() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "quotebook-route-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    let database_url = format!("sqlite:{}", temp_path.display());
    let db = quotebook::db::spawn(&database_url).await.unwrap();
    let app = app_with(Arc::new(db));

    let (status, body) = send(&app, "POST", "/authors", Some(json!({"name": "Yoggi Berra"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1, "name": "Yoggi Berra", "surname": null}));

    let (status, body) = send(
        &app,
        "POST",
        "/authors/1/quotes",
        Some(json!({"text": "Theory and practice...", "rating": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({"id": 1, "author_id": 1, "text": "Theory and practice...", "rating": 1})
    );

    let (status, body) = send(&app, "POST", "/authors/2/quotes", Some(json!({"text": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Author with id=2 not found"}));

    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(PathBuf::from(format!("{}{suffix}", temp_path.display())));
    }
}

#[tokio::test]
async fn quote_create_requires_text() {
    let app = memory_app();
    let author_id = seed_author(&app, "Rick").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/authors/{author_id}/quotes"),
        Some(json!({"rating": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Attribute 'text' is required"}));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/authors/{author_id}/quotes"),
        Some(json!({"text": "x".repeat(256)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quote_update_skips_out_of_range_rating_but_applies_other_fields() {
    let app = memory_app();
    let author_id = seed_author(&app, "Waldi").await;
    let quote = seed_quote(&app, author_id, "old text", 3).await;
    let uri = format!("/quotes/{}", quote["id"]);

    for bad in [0, 6, -1, 100] {
        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({"text": format!("new {bad}"), "rating": bad})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rating"], 3);
        assert_eq!(body["text"], format!("new {bad}"));
    }

    // Rating alone, out of range: still a successful no-op.
    let (status, body) = send(&app, "PUT", &uri, Some(json!({"rating": 7}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 3);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"rating": "5"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 5);
}

#[tokio::test]
async fn quote_rating_beyond_integer_range_is_skipped_not_rejected() {
    let app = memory_app();
    let author_id = seed_author(&app, "Yoggi Berra").await;
    let uri = format!("/authors/{author_id}/quotes");

    let (status, body) = send_raw(
        &app,
        "POST",
        &uri,
        r#"{"text": "t", "rating": 99999999999999999999}"#,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rating"], 1);

    let (status, body) = send_raw(&app, "POST", &uri, r#"{"text": "whole", "rating": 4.0}"#).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rating"], 4);

    let quote_uri = format!("/quotes/{}", body["id"]);
    let (status, body) =
        send_raw(&app, "PUT", &quote_uri, r#"{"text": "new", "rating": 9.0}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "new");
    assert_eq!(body["rating"], 4);

    let (status, body) = send_raw(&app, "PUT", &quote_uri, r#"{"rating": 2.5}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 4);

    let (status, body) = send_raw(&app, "PUT", &quote_uri, r#"{"rating": true}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Attribute 'rating' must be an integer"}));
}

#[tokio::test]
async fn quote_update_twice_is_idempotent() {
    let app = memory_app();
    let a = seed_author(&app, "A").await;
    let b = seed_author(&app, "B").await;
    let quote = seed_quote(&app, a, "text", 2).await;
    let uri = format!("/quotes/{}", quote["id"]);

    let payload = json!({"author_id": b, "text": "moved", "rating": 4});
    let (s1, first) = send(&app, "PUT", &uri, Some(payload.clone())).await;
    let (s2, second) = send(&app, "PUT", &uri, Some(payload)).await;
    assert_eq!((s1, s2), (StatusCode::OK, StatusCode::OK));
    assert_eq!(first, second);
    assert_eq!(second["author_id"], b);
}

#[tokio::test]
async fn quote_update_errors() {
    let app = memory_app();
    let a = seed_author(&app, "A").await;
    let quote = seed_quote(&app, a, "text", 2).await;
    let uri = format!("/quotes/{}", quote["id"]);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"author": "nobody"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Nothing to update"}));

    let (status, body) = send(&app, "PUT", "/quotes/99", Some(json!({"text": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Quote with id=99 not found"}));

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"author_id": 77}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Author with id=77 not found"}));

    let (status, _) = send(&app, "PUT", &uri, Some(json!({"rating": "high"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, unchanged) = send(&app, "GET", &uri, None).await;
    assert_eq!(unchanged, quote);
}

#[tokio::test]
async fn quote_filter_by_rating_returns_exact_subset() {
    let app = memory_app();
    let a = seed_author(&app, "A").await;
    let b = seed_author(&app, "B").await;
    let q1 = seed_quote(&app, a, "one", 5).await;
    seed_quote(&app, a, "two", 4).await;
    let q3 = seed_quote(&app, b, "three", 5).await;
    seed_quote(&app, b, "four", 1).await;

    let (status, body) = send(&app, "GET", "/quotes?rating=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([q1, q3.clone()]));

    let (_, body) = send(&app, "GET", &format!("/quotes?rating=5&author_id={b}"), None).await;
    assert_eq!(body, json!([q3]));

    let (_, body) = send(&app, "GET", "/quotes", None).await;
    assert_eq!(body.as_array().unwrap().len(), 4);

    let (status, body) = send(&app, "GET", "/quotes?rating=top", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"message": "Filter attribute 'rating' must be an integer"})
    );
}

#[tokio::test]
async fn quote_delete_returns_remaining_quotes() {
    let app = memory_app();
    let a = seed_author(&app, "A").await;
    let q1 = seed_quote(&app, a, "one", 1).await;
    let q2 = seed_quote(&app, a, "two", 2).await;

    let (status, body) = send(&app, "DELETE", &format!("/quotes/{}", q1["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([q2]));

    let (status, _) = send(&app, "DELETE", &format!("/quotes/{}", q1["id"]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_count_and_random() {
    let app = memory_app();

    let (status, body) = send(&app, "GET", "/quotes/random", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "No quotes available"}));

    let a = seed_author(&app, "A").await;
    let q1 = seed_quote(&app, a, "one", 1).await;
    let q2 = seed_quote(&app, a, "two", 2).await;

    let (status, body) = send(&app, "GET", "/quotes/count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"count": 2}));

    let (status, body) = send(&app, "GET", "/quotes/random", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body == q1 || body == q2);
}

#[tokio::test]
async fn site_routes_and_fallback() {
    let app = memory_app();

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Hello, World!"));

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/about")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-request-id"], "req-123");
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"About quotebook");

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().contains_key("x-request-id"));
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"message": "Not Found"}));
}
