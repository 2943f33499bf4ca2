//! HTTP server for the gateway

pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::bootstrap::{SeedReport, Seeder};
use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::providers::Pipeline;
use state::AppState;

/// Gateway HTTP server
pub struct GatewayServer {
    state: AppState,
}

impl GatewayServer {
    /// Create a server around an already constructed pipeline client
    pub fn new(config: GatewayConfig, pipeline: Arc<dyn Pipeline>) -> Self {
        Self {
            state: AppState::new(config, pipeline),
        }
    }

    /// Shared state (for tests and embedding)
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Push the configured seed sources into the pipeline and mark the
    /// gateway ready
    pub async fn seed(&self) -> Option<SeedReport> {
        seed_pipeline(&self.state).await
    }

    /// Bind the listener and serve until the process ends
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::config(format!("Invalid address: {}", e)))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::config(format!("Failed to bind: {}", e)))?;

        tracing::info!("Starting gateway on http://{}", addr);
        tracing::info!("API documentation: http://{}{}", addr, routes::DOCS_PATH);

        self.serve(listener).await
    }

    /// Serve on an already bound listener. Seeding runs in the background
    /// and `/ready` answers 503 until it has finished.
    pub async fn serve(self, listener: tokio::net::TcpListener) -> Result<()> {
        let state = self.state.clone();
        tokio::spawn(async move {
            seed_pipeline(&state).await;
        });

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        self.state.config().address()
    }
}

async fn seed_pipeline(state: &AppState) -> Option<SeedReport> {
    let seed = &state.config().seed;

    let report = if seed.enabled {
        let seeder = Seeder::new(Arc::clone(state.pipeline()), seed.sources.clone());
        Some(seeder.run().await)
    } else {
        tracing::info!("Startup seeding disabled");
        None
    };

    state.set_ready(true);
    report
}

/// Build the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let enable_cors = state.config().server.enable_cors;

    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .merge(routes::gateway_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        router.layer(cors_layer())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
        ])
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(state: axum::extract::State<AppState>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ErrorMode, LlmProvider};
    use crate::providers::MockPipeline;
    use crate::types::{ChatTurn, SourceRef, Transcript};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    fn test_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.llm.provider = LlmProvider::Ollama;
        config
    }

    fn app(mock: MockPipeline) -> Router {
        router(AppState::new(test_config(), Arc::new(mock)))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_add_source_success() {
        let mut mock = MockPipeline::new();
        mock.expect_add()
            .withf(|s| *s == SourceRef::new("https://example.com/page"))
            .times(1)
            .returning(|_| Ok(()));

        let (status, body) = send(
            app(mock),
            post_json("/add", json!({ "source": "https://example.com/page" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "message": "Source 'https://example.com/page' added successfully." })
        );
    }

    #[tokio::test]
    async fn test_add_source_failure_stays_200() {
        let mut mock = MockPipeline::new();
        mock.expect_add()
            .returning(|_| Err(Error::pipeline("HTTP 500 - embedding quota exceeded")));

        let (status, body) = send(
            app(mock),
            post_json("/api/v1/add", json!({ "source": "https://example.com/page" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("An error occurred"));
        assert!(message.contains("embedding quota exceeded"));
        assert!(message.contains("https://embedchain.com/slack"));
    }

    #[tokio::test]
    async fn test_query_returns_answer() {
        let mut mock = MockPipeline::new();
        mock.expect_query()
            .withf(|q| q == "Who heads the CSE department?")
            .times(1)
            .returning(|_| Ok("Dr. Example".to_string()));

        let (status, body) = send(
            app(mock),
            post_json("/query", json!({ "question": "Who heads the CSE department?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "answer": "Dr. Example" }));
    }

    #[tokio::test]
    async fn test_post_chat_uses_query() {
        let mut mock = MockPipeline::new();
        mock.expect_query().times(1).returning(|_| Ok("Hello!".to_string()));
        mock.expect_chat().never();

        let (status, body) = send(app(mock), post_json("/chat", json!({ "question": "Hi" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": "Hello!" }));
    }

    #[tokio::test]
    async fn test_session_chat() {
        let mut mock = MockPipeline::new();
        mock.expect_chat()
            .withf(|q, session| q == "Hello" && session.as_deref() == Some("abc123"))
            .times(1)
            .returning(|_, _| Ok("Hi there".to_string()));

        let (status, body) = send(app(mock), get("/api/v1/chat?query=Hello&session_id=abc123")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": "Hi there" }));
    }

    #[tokio::test]
    async fn test_chat_without_session() {
        let mut mock = MockPipeline::new();
        mock.expect_chat()
            .withf(|_, session| session.is_none())
            .times(1)
            .returning(|_, _| Err(Error::pipeline("rate limited")));

        let (status, body) = send(app(mock), get("/api/v1/chat?query=Hello")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().starts_with("An error occurred"));
    }

    #[tokio::test]
    async fn test_chat_history() {
        let mut mock = MockPipeline::new();
        mock.expect_history()
            .withf(|app_id| app_id == "embedchain-demo-app")
            .times(1)
            .returning(|_| {
                Ok(vec![ChatTurn {
                    question: "Hello".to_string(),
                    answer: "Hi there".to_string(),
                    session_id: Some("abc123".to_string()),
                    created_at: None,
                }])
            });

        let (status, body) = send(app(mock), get("/api/v1/chat_history")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"][0]["answer"], "Hi there");
        assert_eq!(body["response"][0]["session_id"], "abc123");
    }

    #[tokio::test]
    async fn test_chat_history_failure_is_text() {
        let mut mock = MockPipeline::new();
        mock.expect_history()
            .returning(|_| Err(Error::pipeline("memory store offline")));

        let (status, body) = send(app(mock), get("/api/v1/chat_history")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().contains("memory store offline"));
    }

    #[tokio::test]
    async fn test_root_redirects_to_docs() {
        let response = app(MockPipeline::new()).oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], routes::DOCS_PATH);

        let (status, body) = send(app(MockPipeline::new()), get(routes::DOCS_PATH)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["endpoints"]["POST /add"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let mut mock = MockPipeline::new();
        mock.expect_add().never();

        let response = app(mock)
            .oneshot(post_json("/add", json!({ "url": "https://example.com" })))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_status_mode_uses_http_codes() {
        let mut config = test_config();
        config.server.error_mode = ErrorMode::Status;

        let mut mock = MockPipeline::new();
        mock.expect_query()
            .returning(|_| Err(Error::pipeline("HTTP 503 - overloaded")));

        let app = router(AppState::new(config, Arc::new(mock)));
        let (status, body) = send(app, post_json("/query", json!({ "question": "Hi" }))).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["type"], "pipeline_error");
    }

    #[tokio::test]
    async fn test_ready_after_seeding() {
        let mut config = test_config();
        config.seed.sources = vec![SourceRef::new("https://example.com")];

        let mut mock = MockPipeline::new();
        mock.expect_add().times(1).returning(|_| Ok(()));

        let server = GatewayServer::new(config, Arc::new(mock));
        let response = router(server.state().clone()).oneshot(get("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let report = server.seed().await.unwrap();
        assert_eq!(report.added.len(), 1);

        let response = router(server.state().clone()).oneshot(get("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_seeding_disabled() {
        let mut config = test_config();
        config.seed.enabled = false;

        let mut mock = MockPipeline::new();
        mock.expect_add().never();

        let server = GatewayServer::new(config, Arc::new(mock));
        assert!(server.seed().await.is_none());
        assert!(server.state().is_ready());
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(MockPipeline::new()).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_timeout_in_band_stays_200() {
        let mut mock = MockPipeline::new();
        mock.expect_query()
            .returning(|_| Err(Error::Timeout("operation timed out".to_string())));

        let (status, body) = send(app(mock), post_json("/query", json!({ "question": "Hi" }))).await;

        assert_eq!(status, StatusCode::OK);
        let answer = body["answer"].as_str().unwrap();
        assert!(answer.starts_with("An error occurred"));
        assert!(answer.contains("timed out"));
    }

    #[tokio::test]
    async fn test_timeout_status_mode_is_504() {
        let mut config = test_config();
        config.server.error_mode = ErrorMode::Status;

        let mut mock = MockPipeline::new();
        mock.expect_chat()
            .returning(|_, _| Err(Error::Timeout("operation timed out".to_string())));

        let app = router(AppState::new(config, Arc::new(mock)));
        let (status, body) = send(app, get("/api/v1/chat?query=Hello")).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["type"], "timeout");
    }

    /// Pipeline whose `add` waits until the test releases it
    struct GatedPipeline {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl Pipeline for GatedPipeline {
        async fn add(&self, _source: &SourceRef) -> Result<()> {
            self.gate.notified().await;
            Ok(())
        }

        async fn query(&self, _question: &str) -> Result<String> {
            Err(Error::internal("not used"))
        }

        async fn chat(&self, _question: &str, _session_id: Option<String>) -> Result<String> {
            Err(Error::internal("not used"))
        }

        async fn history(&self, _app_id: &str) -> Result<Transcript> {
            Ok(Vec::new())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &'static str {
            "gated"
        }
    }

    #[tokio::test]
    async fn test_serves_while_seeding() {
        let mut config = test_config();
        config.seed.sources = vec![SourceRef::new("https://example.com")];

        let gate = Arc::new(Notify::new());
        let pipeline = GatedPipeline { gate: Arc::clone(&gate) };
        let server = GatewayServer::new(config, Arc::new(pipeline));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ready_url = format!("http://{}/ready", listener.local_addr().unwrap());
        tokio::spawn(server.serve(listener));

        let client = reqwest::Client::new();
        let response = client.get(&ready_url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        gate.notify_one();

        let mut status = StatusCode::SERVICE_UNAVAILABLE;
        for _ in 0..50 {
            status = client.get(&ready_url).send().await.unwrap().status();
            if status == StatusCode::OK {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(status, StatusCode::OK);
    }
}
