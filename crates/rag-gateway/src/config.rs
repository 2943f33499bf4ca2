//! Configuration for the gateway
//!
//! Settings come from a TOML file (optional) and are then overridden by
//! environment variables. Exactly one pipeline profile is active per process.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{DataType, SourceRef};

/// Environment variable naming an explicit settings file
pub const CONFIG_PATH_ENV: &str = "RAG_GATEWAY_CONFIG";

/// Settings file looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "rag-gateway.toml";

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener configuration
    pub server: ServerConfig,
    /// Remote pipeline connection
    pub pipeline: PipelineConfig,
    /// Pipeline identity
    pub app: AppSection,
    /// LLM backend selection and generation parameters
    pub llm: LlmSection,
    /// Embedding backend selection (pipeline default when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedder: Option<EmbedderSection>,
    /// Sources pushed into the pipeline at startup
    pub seed: SeedConfig,
}

/// How backend failures are rendered to HTTP clients
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// HTTP 200 with the failure text inside the regular response field
    #[default]
    InBand,
    /// Standard HTTP status codes with an error body
    Status,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Rendering of backend failures
    pub error_mode: ErrorMode,
    /// Where callers are pointed to when a request fails
    pub support_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
            error_mode: ErrorMode::InBand,
            support_url: "https://embedchain.com/slack".to_string(),
        }
    }
}

/// Remote pipeline connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base URL of the pipeline service
    pub base_url: String,
    /// Bearer token for the pipeline service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Let the pipeline consult the web when answering
    pub online: bool,
    /// Register the profile with the pipeline before seeding
    pub register_on_start: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
            timeout_secs: 120,
            online: true,
            register_on_start: true,
        }
    }
}

/// `app` section of the profile
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppSection {
    pub config: AppIdentity,
}

/// `app.config` of the profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppIdentity {
    /// Pipeline identity; also keys the chat history
    pub id: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            id: "embedchain-demo-app".to_string(),
        }
    }
}

/// LLM backend selector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    HuggingFace,
    Ollama,
}

impl LlmProvider {
    /// Environment variable holding the credential this provider needs
    pub fn credential_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::OpenAi => Some("OPENAI_API_KEY"),
            LlmProvider::HuggingFace => Some("HUGGINGFACE_ACCESS_TOKEN"),
            LlmProvider::Ollama => None,
        }
    }
}

/// `llm` section of the profile
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LlmSection {
    pub provider: LlmProvider,
    pub config: LlmParams,
}

/// Generation parameters passed through to the LLM backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmParams {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Provider credential, filled from the environment when unset.
    /// The pipeline makes the LLM calls, so it is sent along with the
    /// registered profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for LlmParams {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo-1106".to_string(),
            temperature: None,
            max_tokens: None,
            top_p: None,
            api_key: None,
        }
    }
}

/// Embedding backend selector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderProvider {
    OpenAi,
    HuggingFace,
    Ollama,
}

impl EmbedderProvider {
    /// Environment variable holding the credential this provider needs
    pub fn credential_env(&self) -> Option<&'static str> {
        match self {
            EmbedderProvider::OpenAi => Some("OPENAI_API_KEY"),
            EmbedderProvider::HuggingFace => Some("HUGGINGFACE_ACCESS_TOKEN"),
            EmbedderProvider::Ollama => None,
        }
    }
}

/// `embedder` section of the profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedderSection {
    pub provider: EmbedderProvider,
    #[serde(default)]
    pub config: EmbedderParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EmbedderParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Embedding credential, registered with the profile like the LLM one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Startup seeding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Run the seeder at all
    pub enabled: bool,
    /// Sources in insertion order
    pub sources: Vec<SourceRef>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sources: default_seed_sources(),
        }
    }
}

fn default_seed_sources() -> Vec<SourceRef> {
    vec![
        SourceRef::typed("https://www.skit.ac.in", DataType::WebPage),
        SourceRef::typed(
            "https://www.skit.ac.in/index.php?option=com_schuweb_sitemap&view=xml&tmpl=component&id=1",
            DataType::Sitemap,
        ),
        SourceRef::typed("https://www.skit.ac.in/faculty-it.html", DataType::WebPage),
        SourceRef::typed("https://www.skit.ac.in/faculty-cse.html", DataType::WebPage),
        SourceRef::new("https://www.skit.ac.in/images/cs-files/cse_faculty_list_2022-23.pdf"),
        SourceRef::typed("https://www.skit.ac.in/faculty-ce.html", DataType::WebPage),
        SourceRef::typed("https://www.skit.ac.in/examination-cell.html", DataType::WebPage),
        SourceRef::typed("https://www.skit.ac.in/noticess.html", DataType::WebPage),
    ]
}

/// The profile registered with the pipeline: identity, LLM and embedder
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PipelineProfile {
    pub app: AppSection,
    pub llm: LlmSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedder: Option<EmbedderSection>,
}

impl GatewayConfig {
    /// Load configuration from the settings file and the process environment,
    /// then validate it.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`GatewayConfig::load`] with `lookup` standing in for the
    /// process environment
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match Self::locate_file(&lookup) {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::load_from(&path)?
            }
            None => {
                tracing::info!("No settings file found, using defaults");
                Self::default()
            }
        };

        config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parse a settings file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Settings file to use: explicit env path, then working directory,
    /// then the user config directory
    fn locate_file<F>(lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join("rag-gateway").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("RAG_GATEWAY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RAG_GATEWAY_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid RAG_GATEWAY_PORT: {}", port),
            }
        }
        if let Some(url) = lookup("PIPELINE_BASE_URL") {
            self.pipeline.base_url = url;
        }
        if let Some(key) = lookup("PIPELINE_API_KEY") {
            self.pipeline.api_key = Some(key);
        }

        if self.llm.config.api_key.is_none() {
            if let Some(var) = self.llm.provider.credential_env() {
                self.llm.config.api_key = lookup(var).filter(|v| !v.is_empty());
            }
        }

        if let Some(embedder) = self.embedder.as_mut() {
            if embedder.config.api_key.is_none() {
                if let Some(var) = embedder.provider.credential_env() {
                    embedder.config.api_key = lookup(var).filter(|v| !v.is_empty());
                }
            }
        }
    }

    /// Reject configurations the gateway cannot serve with
    pub fn validate(&self) -> Result<()> {
        if self.app.config.id.trim().is_empty() {
            return Err(Error::config("app.config.id must not be empty"));
        }

        if !self.pipeline.base_url.starts_with("http://")
            && !self.pipeline.base_url.starts_with("https://")
        {
            return Err(Error::config(format!(
                "pipeline.base_url must be an http(s) URL, got '{}'",
                self.pipeline.base_url
            )));
        }

        if self.pipeline.timeout_secs == 0 {
            return Err(Error::config("pipeline.timeout_secs must be at least 1"));
        }

        if let Some(var) = self.llm.provider.credential_env() {
            if self.llm.config.api_key.is_none() {
                return Err(Error::config(format!(
                    "LLM provider {:?} requires a credential. Set the {} environment variable.",
                    self.llm.provider, var
                )));
            }
        }

        if let Some(embedder) = &self.embedder {
            if let Some(var) = embedder.provider.credential_env() {
                if embedder.config.api_key.is_none() {
                    return Err(Error::config(format!(
                        "Embedder provider {:?} requires a credential. Set the {} environment variable.",
                        embedder.provider, var
                    )));
                }
            }
        }

        if let Some(t) = self.llm.config.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(Error::config(format!("llm.config.temperature out of range: {}", t)));
            }
        }
        if let Some(p) = self.llm.config.top_p {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::config(format!("llm.config.top_p out of range: {}", p)));
            }
        }

        Ok(())
    }

    /// Profile registered with the pipeline
    pub fn profile(&self) -> PipelineProfile {
        PipelineProfile {
            app: self.app.clone(),
            llm: self.llm.clone(),
            embedder: self.embedder.clone(),
        }
    }

    /// Application id keying the chat history
    pub fn app_id(&self) -> &str {
        &self.app.config.id
    }

    /// Listener address as `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
