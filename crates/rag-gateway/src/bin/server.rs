//! Gateway server binary
//!
//! Run with: cargo run -p rag-gateway --bin rag-gateway-server

use std::sync::Arc;

use rag_gateway::{GatewayConfig, GatewayServer, HttpPipeline, Pipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_gateway=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (missing credentials are fatal here)
    let config = GatewayConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - App id: {}", config.app_id());
    tracing::info!("  - LLM: {:?} / {}", config.llm.provider, config.llm.config.model);
    if let Some(embedder) = &config.embedder {
        tracing::info!("  - Embedder: {:?}", embedder.provider);
    }
    tracing::info!("  - Pipeline: {}", config.pipeline.base_url);
    tracing::info!("  - Seed sources: {}", config.seed.sources.len());

    let pipeline = HttpPipeline::new(&config)?;

    tracing::info!("Checking pipeline at {}...", config.pipeline.base_url);
    match pipeline.health_check().await {
        Ok(true) => tracing::info!("Pipeline ({}) is running", pipeline.name()),
        _ => tracing::warn!(
            "Pipeline not available at {}; requests will report errors until it is",
            config.pipeline.base_url
        ),
    }

    if config.pipeline.register_on_start {
        if let Err(e) = pipeline.register(&config.profile()).await {
            tracing::warn!("Failed to register app profile: {}", e);
        }
    }

    let server = GatewayServer::new(config, Arc::new(pipeline));

    println!("\nGateway starting...");
    println!("  API: http://{}", server.address());
    println!("  Docs: http://{}/docs", server.address());
    println!("\nEndpoints:");
    println!("  POST /add                 - Add a source");
    println!("  POST /query               - Ask a question");
    println!("  POST /chat                - Ask without a session");
    println!("  GET  /api/v1/chat         - Chat within a session");
    println!("  GET  /api/v1/chat_history - Chat transcript");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
