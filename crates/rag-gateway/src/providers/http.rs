//! HTTP client for a remote pipeline service
//!
//! Every call is scoped by the application id: `{base_url}/{app_id}/{verb}`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{GatewayConfig, PipelineProfile};
use crate::error::{Error, Result};
use crate::types::{DataType, SourceRef, Transcript};

use super::pipeline::Pipeline;

/// Remote pipeline reached over HTTP
pub struct HttpPipeline {
    /// HTTP client
    client: Client,
    /// Service base URL without trailing slash
    base_url: String,
    /// Application the calls are scoped to
    app_id: String,
    /// Bearer token
    api_key: Option<String>,
    /// Allow the pipeline to consult the web
    online: bool,
}

#[derive(Serialize)]
struct AddRequest<'a> {
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_type: Option<DataType>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    online: bool,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    online: bool,
}

#[derive(Deserialize)]
struct AnswerBody {
    response: String,
}

#[derive(Deserialize)]
struct HistoryBody {
    #[serde(default)]
    history: Transcript,
}

impl HttpPipeline {
    /// Create a client from the gateway configuration
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.pipeline.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.pipeline.base_url.trim_end_matches('/').to_string(),
            app_id: config.app_id().to_string(),
            api_key: config.pipeline.api_key.clone(),
            online: config.pipeline.online,
        })
    }

    /// Register the active profile with the pipeline service
    pub async fn register(&self, profile: &PipelineProfile) -> Result<()> {
        tracing::info!(
            "Registering app '{}' (llm: {:?}/{})",
            self.app_id,
            profile.llm.provider,
            profile.llm.config.model
        );
        let request = self.client.post(self.app_url("create")).json(profile);
        self.send(request).await?;
        Ok(())
    }

    fn app_url(&self, verb: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.app_id, verb)
    }

    fn history_url(&self, app_id: &str) -> String {
        format!("{}/{}/history", self.base_url, app_id)
    }

    /// Send a request, turning non-2xx answers into pipeline errors
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        };

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::pipeline(format!("HTTP {} - {}", status, body.trim())));
        }

        Ok(response)
    }

    async fn answer(&self, request: RequestBuilder) -> Result<String> {
        let body: AnswerBody = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| body_error(e, "pipeline answer"))?;
        Ok(body.response)
    }
}

/// A body that stalls past the client timeout stays a timeout
fn body_error(err: reqwest::Error, what: &str) -> Error {
    if err.is_timeout() {
        Error::from(err)
    } else {
        Error::pipeline(format!("Failed to parse {}: {}", what, err))
    }
}

#[async_trait]
impl Pipeline for HttpPipeline {
    async fn add(&self, source: &SourceRef) -> Result<()> {
        let request = self.client.post(self.app_url("add")).json(&AddRequest {
            source: &source.source,
            data_type: source.data_type,
        });
        self.send(request).await?;
        tracing::debug!("Pipeline accepted source {}", source);
        Ok(())
    }

    async fn query(&self, question: &str) -> Result<String> {
        let request = self.client.post(self.app_url("query")).json(&QueryRequest {
            query: question,
            online: self.online,
        });
        self.answer(request).await
    }

    async fn chat(&self, question: &str, session_id: Option<String>) -> Result<String> {
        let request = self.client.post(self.app_url("chat")).json(&ChatRequest {
            message: question,
            session_id,
            online: self.online,
        });
        self.answer(request).await
    }

    async fn history(&self, app_id: &str) -> Result<Transcript> {
        let request = self.client.get(self.history_url(app_id));
        let body: HistoryBody = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| body_error(e, "chat history"))?;
        Ok(body.history)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
