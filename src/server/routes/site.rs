use crate::server::router::QuotebookState;
use axum::{Json, Router, extract::State, routing::get};

pub fn router() -> Router<QuotebookState> {
    Router::new()
        .route("/", get(hello))
        .route("/about", get(about))
}

async fn hello() -> Json<&'static str> {
    Json("Hello, World!")
}

async fn about(State(state): State<QuotebookState>) -> String {
    state.about.to_string()
}
