use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use quotebook::server::{QuotebookState, quotebook_router};
use quotebook::service::RecordService;
use quotebook::store::MemoryStore;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn memory_app() -> Router {
    let records = RecordService::new(Arc::new(MemoryStore::new()));
    quotebook_router(QuotebookState::new(records, Arc::from("About quotebook")))
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

#[tokio::test]
async fn author_create_returns_201_with_null_surname() {
    let app = memory_app();

    let (status, body) = send(&app, "POST", "/authors", Some(json!({"name": "Yoggi Berra"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1, "name": "Yoggi Berra", "surname": null}));

    let (status, body) = send(
        &app,
        "POST",
        "/authors",
        Some(json!({"name": "Rick", "surname": "Cook", "ignored": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 2, "name": "Rick", "surname": "Cook"}));
}

#[tokio::test]
async fn author_create_without_name_is_rejected() {
    let app = memory_app();

    for payload in [json!({}), json!({"surname": "Cook"}), json!({"nam": "typo"})] {
        let (status, body) = send(&app, "POST", "/authors", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Attribute 'name' is required"}));
    }

    let (_, list) = send(&app, "GET", "/authors", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn author_create_rejects_malformed_bodies() {
    let app = memory_app();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/authors")
                .header("content-type", "application/json")
                .body(Body::from("not-json"))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].is_string());

    let (status, body) = send(&app, "POST", "/authors", Some(json!(["Rick"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Request body must be a JSON object"}));

    let (status, _) = send(&app, "POST", "/authors", Some(json!({"name": 42}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn author_duplicate_name_is_bad_request() {
    let app = memory_app();
    send(&app, "POST", "/authors", Some(json!({"name": "Rick"}))).await;

    let (status, body) = send(&app, "POST", "/authors", Some(json!({"name": "Rick"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Author with name='Rick' already exists"}));
}

#[tokio::test]
async fn author_get_update_and_not_found() {
    let app = memory_app();
    send(&app, "POST", "/authors", Some(json!({"name": "Rick", "surname": "Cook"}))).await;

    let (status, body) = send(&app, "GET", "/authors/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Rick");

    let (status, body) = send(&app, "GET", "/authors/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Author with id=5 not found"}));

    let (status, _) = send(&app, "GET", "/authors/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "PUT", "/authors/1", Some(json!({"surname": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "name": "Rick", "surname": null}));

    let (status, body) = send(&app, "PUT", "/authors/1", Some(json!({"age": 40}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Nothing to update"}));

    let (status, _) = send(&app, "PUT", "/authors/9", Some(json!({"name": "Ghost"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_update_twice_is_idempotent() {
    let app = memory_app();
    send(&app, "POST", "/authors", Some(json!({"name": "Rick"}))).await;

    let payload = json!({"name": "Richard", "surname": "Cook"});
    let (_, first) = send(&app, "PUT", "/authors/1", Some(payload.clone())).await;
    let (_, second) = send(&app, "PUT", "/authors/1", Some(payload)).await;
    assert_eq!(first, second);
    assert_eq!(second, json!({"id": 1, "name": "Richard", "surname": "Cook"}));
}

#[tokio::test]
async fn author_delete_cascades_to_quotes() {
    let app = memory_app();
    send(&app, "POST", "/authors", Some(json!({"name": "Doomed"}))).await;
    send(&app, "POST", "/authors", Some(json!({"name": "Keeper"}))).await;

    let mut quote_ids = Vec::new();
    for text in ["a", "b", "c"] {
        let (status, q) = send(&app, "POST", "/authors/1/quotes", Some(json!({"text": text}))).await;
        assert_eq!(status, StatusCode::CREATED);
        quote_ids.push(q["id"].as_i64().unwrap());
    }
    send(&app, "POST", "/authors/2/quotes", Some(json!({"text": "kept"}))).await;

    let (status, remaining) = send(&app, "DELETE", "/authors/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(remaining, json!([{"id": 2, "name": "Keeper", "surname": null}]));

    for id in quote_ids {
        let (status, body) = send(&app, "GET", &format!("/quotes/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": format!("Quote with id={id} not found")}));
    }

    let (_, quotes) = send(&app, "GET", "/quotes", None).await;
    assert_eq!(quotes.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", "/authors/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_quotes_lists_owned_quotes() {
    let app = memory_app();
    send(&app, "POST", "/authors", Some(json!({"name": "Yoggi Berra"}))).await;
    send(&app, "POST", "/authors", Some(json!({"name": "Other"}))).await;
    send(&app, "POST", "/authors/1/quotes", Some(json!({"text": "t1", "rating": 3}))).await;
    send(&app, "POST", "/authors/2/quotes", Some(json!({"text": "t2"}))).await;

    let (status, body) = send(&app, "GET", "/authors/1/quotes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "author": {"id": 1, "name": "Yoggi Berra", "surname": null},
            "quotes": [{"id": 1, "author_id": 1, "text": "t1", "rating": 3}],
        })
    );

    let (status, _) = send(&app, "GET", "/authors/7/quotes", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_list_filters_by_query() {
    let app = memory_app();
    send(&app, "POST", "/authors", Some(json!({"name": "Rick", "surname": "Cook"}))).await;
    send(&app, "POST", "/authors", Some(json!({"name": "Waldi", "surname": "Ravens"}))).await;

    let (status, body) = send(&app, "GET", "/authors?surname=Ravens", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": 2, "name": "Waldi", "surname": "Ravens"}]));

    let (status, body) = send(&app, "GET", "/authors?age=3", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Unknown filter attribute 'age'"}));
}
