//! Response bodies returned by the gateway
//!
//! Every endpoint keeps the same shape whether the pipeline call succeeded
//! or not; in-band failures put the error text in the regular field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `POST /add`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Message confirming a source was handed to the pipeline
    pub fn added(source: &str) -> Self {
        Self {
            message: format!("Source '{}' added successfully.", source),
        }
    }
}

/// Response of `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Response of the chat endpoints and the chat history endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse<T = String> {
    pub response: T,
}

/// A single turn of a conversation as stored by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    /// What the user asked
    pub question: String,
    /// What the pipeline answered
    pub answer: String,
    /// Conversation this turn belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Ordered chat transcript for one application
pub type Transcript = Vec<ChatTurn>;

/// Payload of `GET /api/v1/chat_history`: the transcript, or the error text
/// when the pipeline could not produce one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HistoryPayload {
    Transcript(Transcript),
    Error(String),
}
