//! Pipeline trait: the external RAG engine behind the gateway

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{SourceRef, Transcript};

/// Opaque, stateful retrieval-augmented-generation engine.
///
/// The gateway only threads calls through; ingestion, retrieval and
/// generation all happen on the other side of this trait.
///
/// Implementations:
/// - `HttpPipeline`: remote pipeline service over HTTP
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Hand a source to the pipeline for ingestion
    async fn add(&self, source: &SourceRef) -> Result<()>;

    /// Answer a one-off question
    async fn query(&self, question: &str) -> Result<String>;

    /// Answer a question within a conversation
    async fn chat(&self, question: &str, session_id: Option<String>) -> Result<String>;

    /// Full chat transcript for an application
    async fn history(&self, app_id: &str) -> Result<Transcript>;

    /// Check if the pipeline is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Pipeline name for logging
    fn name(&self) -> &'static str;
}
