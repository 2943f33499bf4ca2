//! Core types for the gateway

pub mod request;
pub mod response;
pub mod source;

pub use request::{ChatParams, QuestionRequest, SourceRequest};
pub use response::{AnswerResponse, ChatResponse, ChatTurn, HistoryPayload, MessageResponse, Transcript};
pub use source::{DataType, SourceRef};
