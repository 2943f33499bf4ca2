//! Session-aware chat endpoints

use axum::{
    extract::{Query, State},
    response::Response,
};

use crate::server::state::AppState;
use crate::types::{ChatParams, ChatResponse, HistoryPayload};

/// GET /api/v1/chat?query=...&session_id=... - Continue a conversation
pub async fn chat(State(state): State<AppState>, Query(params): Query<ChatParams>) -> Response {
    tracing::info!(
        "Chat (session: {}): \"{}\"",
        params.session_id.as_deref().unwrap_or("default"),
        params.query
    );

    let result = state
        .pipeline()
        .chat(&params.query, params.session_id)
        .await
        .map(|response| ChatResponse { response });

    state.respond(result, |response| ChatResponse { response })
}

/// GET /api/v1/chat_history - Full transcript of the configured app
pub async fn chat_history(State(state): State<AppState>) -> Response {
    let app_id = state.config().app_id();

    let result = state.pipeline().history(app_id).await.map(|transcript| {
        tracing::debug!("Fetched {} chat turns for '{}'", transcript.len(), app_id);
        ChatResponse {
            response: HistoryPayload::Transcript(transcript),
        }
    });

    state.respond(result, |text| ChatResponse {
        response: HistoryPayload::Error(text),
    })
}
