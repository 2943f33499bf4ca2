//! Application state for the gateway

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{ErrorMode, GatewayConfig};
use crate::error::{Error, Result};
use crate::providers::Pipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: GatewayConfig,
    /// The pipeline every request reads from or writes to
    pipeline: Arc<dyn Pipeline>,
    /// Set once startup seeding has finished
    ready: RwLock<bool>,
}

impl AppState {
    /// Create state around an already constructed pipeline client
    pub fn new(config: GatewayConfig, pipeline: Arc<dyn Pipeline>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                ready: RwLock::new(false),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Get the pipeline client
    pub fn pipeline(&self) -> &Arc<dyn Pipeline> {
        &self.inner.pipeline
    }

    /// Check if the gateway is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }

    /// Text shown to callers when a pipeline call fails
    pub fn failure_text(&self, err: &Error) -> String {
        format!(
            "An error occurred: Error message: {}. Contact support: {}",
            err,
            self.inner.config.server.support_url
        )
    }

    /// Render a pipeline result at the HTTP edge.
    ///
    /// In `in_band` mode a failure keeps the normal response shape and status
    /// 200, with `fallback` building the body from the failure text. In
    /// `status` mode the error's own status code and body are used.
    pub fn respond<T, F>(&self, result: Result<T>, fallback: F) -> Response
    where
        T: Serialize,
        F: FnOnce(String) -> T,
    {
        match result {
            Ok(body) => Json(body).into_response(),
            Err(err) => {
                tracing::error!("Pipeline call failed: {}", err);
                match self.inner.config.server.error_mode {
                    ErrorMode::InBand => Json(fallback(self.failure_text(&err))).into_response(),
                    ErrorMode::Status => err.into_response(),
                }
            }
        }
    }
}
