//! One-shot question endpoints

use axum::{extract::State, response::Response, Json};
use std::time::Instant;

use crate::server::state::AppState;
use crate::types::{AnswerResponse, ChatResponse, QuestionRequest};

/// POST /query - Answer a question, returned as `{"answer"}`
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Response {
    let start = Instant::now();
    tracing::info!("Query: \"{}\"", request.question);

    let result = state
        .pipeline()
        .query(&request.question)
        .await
        .map(|answer| AnswerResponse { answer });

    tracing::info!("Query completed in {}ms", start.elapsed().as_millis());
    state.respond(result, |answer| AnswerResponse { answer })
}

/// POST /chat - Answer a question without a session, returned as `{"response"}`
pub async fn chat_once(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Response {
    tracing::info!("Chat (no session): \"{}\"", request.question);

    let result = state
        .pipeline()
        .query(&request.question)
        .await
        .map(|response| ChatResponse { response });

    state.respond(result, |response| ChatResponse { response })
}
