//! rag-gateway: HTTP gateway over an external retrieval-augmented-generation pipeline
//!
//! The gateway seeds the pipeline with a configured list of sources at
//! startup and exposes endpoints to add sources, ask questions, chat within
//! sessions and read the chat history. Ingestion, retrieval and generation
//! all live behind the [`providers::Pipeline`] trait.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod providers;
pub mod server;
pub mod types;

pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use providers::{HttpPipeline, Pipeline};
pub use server::GatewayServer;
pub use types::{DataType, SourceRef};
