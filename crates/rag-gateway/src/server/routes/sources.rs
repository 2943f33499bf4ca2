//! Source ingestion endpoint

use axum::{extract::State, response::Response, Json};

use crate::server::state::AppState;
use crate::types::{MessageResponse, SourceRef, SourceRequest};

/// POST /add - Hand a source to the pipeline (data type auto-detected)
pub async fn add_source(
    State(state): State<AppState>,
    Json(request): Json<SourceRequest>,
) -> Response {
    tracing::info!("Adding source: {}", request.source);

    let source = SourceRef::new(request.source.as_str());
    let result = state
        .pipeline()
        .add(&source)
        .await
        .map(|()| MessageResponse::added(&request.source));

    state.respond(result, |message| MessageResponse { message })
}
