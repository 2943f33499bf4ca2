//! API routes for the gateway

pub mod chat;
pub mod query;
pub mod sources;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Path of the API description the root redirects to
pub const DOCS_PATH: &str = "/docs";

/// Build all gateway routes
pub fn gateway_routes() -> Router<AppState> {
    Router::new()
        // Session-less app
        .route("/add", post(sources::add_source))
        .route("/query", post(query::query))
        .route("/chat", post(query::chat_once))
        // Versioned app with sessions
        .route("/api/v1/add", post(sources::add_source))
        .route("/api/v1/chat", get(chat::chat))
        .route("/api/v1/chat_history", get(chat::chat_history))
        // Docs
        .route("/", get(root))
        .route(DOCS_PATH, get(docs))
}

/// GET / - Redirect to the API description
async fn root() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, DOCS_PATH)])
}

/// GET /docs - API description
async fn docs() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "rag-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "HTTP gateway over an external RAG pipeline",
        "endpoints": {
            "POST /add": "Add a source. Body: {\"source\": string}. Returns {\"message\"}",
            "POST /api/v1/add": "Same as POST /add",
            "POST /query": "Ask a question. Body: {\"question\": string}. Returns {\"answer\"}",
            "POST /chat": "Ask a question without a session. Body: {\"question\": string}. Returns {\"response\"}",
            "GET /api/v1/chat": "Chat within a session. Query: query, session_id (optional). Returns {\"response\"}",
            "GET /api/v1/chat_history": "Full chat transcript. Returns {\"response\": [turn]}",
            "GET /health": "Liveness",
            "GET /ready": "Readiness (after startup seeding)"
        },
        "errors": "Pipeline failures are reported inside the regular response field, prefixed with \"An error occurred\", unless the server runs with error_mode = \"status\""
    }))
}
