//! Request bodies accepted by the gateway

use serde::{Deserialize, Serialize};

/// Body of `POST /add`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRequest {
    /// URI or path to ingest
    pub source: String,
}

/// Body of `POST /query` and `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRequest {
    /// Free-text question
    pub question: String,
}

/// Query string of `GET /api/v1/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatParams {
    /// The chat message
    pub query: String,
    /// Conversation to continue (pipeline default when absent)
    #[serde(default)]
    pub session_id: Option<String>,
}
