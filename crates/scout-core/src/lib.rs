use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod config;

pub use config::{LlmConfig, LlmProvider, ProviderConfig};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("{provider} rejected credentials (HTTP {status})")]
    ProviderUnauthorized { provider: ProviderKind, status: u16 },
    #[error("{provider} search HTTP {status}")]
    ProviderStatus { provider: ProviderKind, status: u16 },
    #[error("{provider} timed out after {timeout_ms}ms")]
    ProviderTimeout {
        provider: ProviderKind,
        timeout_ms: u64,
    },
    #[error("{provider} unreachable: {message}")]
    ProviderUnreachable {
        provider: ProviderKind,
        message: String,
    },
    #[error("{provider} returned a malformed response: {message}")]
    ProviderMalformedResponse {
        provider: ProviderKind,
        message: String,
    },
    #[error("no search provider available: {0}")]
    NoProviderAvailable(String),
    #[error("llm failed: {0}")]
    Llm(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl Error {
    /// Stable machine-readable code (used in tool envelopes and attempt logs).
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "invalid_query",
            Self::InvalidUrl(_) => "invalid_url",
            Self::ProviderUnauthorized { .. } => "provider_unauthorized",
            Self::ProviderStatus { .. } => "provider_status",
            Self::ProviderTimeout { .. } => "provider_timeout",
            Self::ProviderUnreachable { .. } => "provider_unreachable",
            Self::ProviderMalformedResponse { .. } => "provider_malformed_response",
            Self::NoProviderAvailable(_) => "no_provider_available",
            Self::Llm(_) => "llm_failed",
            Self::NotConfigured(_) => "not_configured",
        }
    }

    pub fn provider(&self) -> Option<ProviderKind> {
        match self {
            Self::ProviderUnauthorized { provider, .. }
            | Self::ProviderStatus { provider, .. }
            | Self::ProviderTimeout { provider, .. }
            | Self::ProviderUnreachable { provider, .. }
            | Self::ProviderMalformedResponse { provider, .. } => Some(*provider),
            _ => None,
        }
    }

    /// Provider-level failures are the ones the selector recovers from by falling back.
    pub fn is_provider_error(&self) -> bool {
        self.provider().is_some()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Brave,
    Searxng,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brave => "brave",
            Self::Searxng => "searxng",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brave" => Ok(Self::Brave),
            "searxng" => Ok(Self::Searxng),
            other => Err(Error::NotConfigured(format!("unknown search provider: {other}"))),
        }
    }
}

/// Order in which configured providers are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderOrder {
    #[default]
    BraveFirst,
    SearxngFirst,
}

impl ProviderOrder {
    pub fn kinds(self) -> [ProviderKind; 2] {
        match self {
            Self::BraveFirst => [ProviderKind::Brave, ProviderKind::Searxng],
            Self::SearxngFirst => [ProviderKind::Searxng, ProviderKind::Brave],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BraveFirst => "brave-first",
            Self::SearxngFirst => "searxng-first",
        }
    }
}

impl FromStr for ProviderOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "brave-first" | "brave" => Ok(Self::BraveFirst),
            "searxng-first" | "searxng" => Ok(Self::SearxngFirst),
            other => Err(Error::NotConfigured(format!(
                "unknown provider order: {other} (allowed: brave-first, searxng-first)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub max_results: Option<usize>,
    pub language: Option<String>,
    pub country: Option<String>,
    /// Per-request timeout; providers clamp it to a sane window.
    pub timeout_ms: Option<u64>,
}

impl SearchQuery {
    /// Build a query, rejecting empty or whitespace-only text.
    pub fn new(query: impl Into<String>) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(Error::InvalidQuery("query must be non-empty".to_string()));
        }
        Ok(Self {
            query,
            max_results: None,
            language: None,
            country: None,
            timeout_ms: None,
        })
    }

    pub fn with_max_results(mut self, n: usize) -> Self {
        self.max_results = Some(n);
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// One provider call made while serving a search (successful or not).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAttempt {
    pub provider: ProviderKind,
    pub ok: bool,
    pub elapsed_ms: u128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Provider that produced `results` (for citation).
    pub provider: ProviderKind,
    #[serde(default)]
    pub attempts: Vec<ProviderAttempt>,
    #[serde(default)]
    pub timings_ms: BTreeMap<String, u128>,
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;
    async fn search(&self, q: &SearchQuery) -> Result<SearchResponse>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub max_tokens: u64,
    pub temperature: f64,
    pub timeout_ms: u64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
            timeout_ms: config::DEFAULT_LLM_TIMEOUT_MS,
        }
    }
}

/// A chat-style LLM backend that turns a single user prompt into text.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn model(&self) -> &str;
    async fn generate(&self, prompt: &str, opts: &GenerateOptions) -> Result<String>;
}
