//! Process-wide configuration, read once from the environment at startup.
//!
//! Every loader has a `from_lookup` form taking a key -> value function so tests can
//! exercise parsing without mutating the process environment.

use crate::{Error, ProviderKind, ProviderOrder, Result};
use std::fmt;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const MAX_RESULTS_CAP: usize = 20;
pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LLM_TIMEOUT_MS: u64 = 60_000;

/// Clamp a caller-supplied search timeout into a bounded window.
pub fn clamp_search_timeout_ms(ms: u64) -> u64 {
    ms.clamp(1_000, 60_000)
}

/// Clamp a requested result count into `1..=MAX_RESULTS_CAP`.
pub fn clamp_max_results(n: usize) -> usize {
    n.clamp(1, MAX_RESULTS_CAP)
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_base_url(key: &str, raw: String) -> Result<String> {
    let parsed = url::Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{key}={raw}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!(
            "{key} must be an http(s) URL (got scheme {})",
            parsed.scheme()
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[derive(Clone)]
pub struct ProviderConfig {
    pub brave_api_key: Option<String>,
    pub searxng_base_url: Option<String>,
    /// Override for the Brave endpoint (tests and proxies).
    pub brave_endpoint: Option<String>,
    pub order: ProviderOrder,
    pub max_results: usize,
    pub timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            brave_api_key: None,
            searxng_base_url: None,
            brave_endpoint: None,
            order: ProviderOrder::default(),
            max_results: DEFAULT_MAX_RESULTS,
            timeout_ms: DEFAULT_SEARCH_TIMEOUT_MS,
        }
    }
}

// Hand-written so the API key never ends up in logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("brave_api_key", &self.brave_api_key.as_ref().map(|_| "<redacted>"))
            .field("searxng_base_url", &self.searxng_base_url)
            .field("brave_endpoint", &self.brave_endpoint)
            .field("order", &self.order)
            .field("max_results", &self.max_results)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let brave_api_key =
            non_empty(get("BRAVE_API_KEY")).or_else(|| non_empty(get("BRAVE_SEARCH_API_KEY")));
        let searxng_base_url = non_empty(get("SEARXNG_BASE_URL"))
            .map(|u| parse_base_url("SEARXNG_BASE_URL", u))
            .transpose()?;
        let brave_endpoint = non_empty(get("SCOUT_BRAVE_ENDPOINT"))
            .map(|u| parse_base_url("SCOUT_BRAVE_ENDPOINT", u))
            .transpose()?;
        let order = match non_empty(get("SCOUT_PROVIDER_ORDER")) {
            Some(s) => s.parse::<ProviderOrder>()?,
            None => ProviderOrder::default(),
        };
        let max_results = non_empty(get("SCOUT_MAX_RESULTS"))
            .and_then(|v| v.parse::<usize>().ok())
            .map(clamp_max_results)
            .unwrap_or(DEFAULT_MAX_RESULTS);
        let timeout_ms = non_empty(get("SCOUT_SEARCH_TIMEOUT_MS"))
            .and_then(|v| v.parse::<u64>().ok())
            .map(clamp_search_timeout_ms)
            .unwrap_or(DEFAULT_SEARCH_TIMEOUT_MS);

        Ok(Self {
            brave_api_key,
            searxng_base_url,
            brave_endpoint,
            order,
            max_results,
            timeout_ms,
        })
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Brave => self.brave_api_key.is_some(),
            ProviderKind::Searxng => self.searxng_base_url.is_some(),
        }
    }

    /// Configured providers, in attempt order.
    pub fn configured(&self) -> Vec<ProviderKind> {
        self.order
            .kinds()
            .into_iter()
            .filter(|k| self.is_configured(*k))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    OpenRouter,
    Ollama,
}

impl LlmProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::Ollama => "http://127.0.0.1:11434",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::OpenRouter => "openai/gpt-4o-mini",
            Self::Ollama => "qwen2.5:7b",
        }
    }

    pub fn requires_api_key(self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            other => Err(Error::NotConfigured(format!(
                "unknown LLM_PROVIDER: {other} (allowed: openai, openrouter, ollama)"
            ))),
        }
    }
}

#[derive(Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl LlmConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match non_empty(get("LLM_PROVIDER")) {
            Some(s) => s.parse::<LlmProvider>()?,
            None => LlmProvider::Ollama,
        };
        let api_key = non_empty(get("LLM_API_KEY"));
        if provider.requires_api_key() && api_key.is_none() {
            return Err(Error::NotConfigured(format!(
                "LLM_API_KEY is required when LLM_PROVIDER={}",
                provider.as_str()
            )));
        }
        let base_url = match non_empty(get("LLM_BASE_URL")) {
            Some(u) => parse_base_url("LLM_BASE_URL", u)?,
            None => provider.default_base_url().to_string(),
        };
        let model =
            non_empty(get("LLM_CHOICE")).unwrap_or_else(|| provider.default_model().to_string());
        let timeout_ms = non_empty(get("SCOUT_LLM_TIMEOUT_MS"))
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LLM_TIMEOUT_MS)
            .clamp(1_000, 600_000);

        Ok(Self {
            provider,
            api_key,
            base_url,
            model,
            timeout_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| m.get(k).cloned()
    }

    #[test]
    fn empty_values_are_treated_as_missing() {
        let c = ProviderConfig::from_lookup(lookup(&[
            ("BRAVE_API_KEY", "   "),
            ("SEARXNG_BASE_URL", ""),
        ]))
        .unwrap();
        assert!(c.brave_api_key.is_none());
        assert!(c.searxng_base_url.is_none());
        assert!(c.configured().is_empty());
    }

    #[test]
    fn configured_follows_order() {
        let both = [
            ("BRAVE_API_KEY", "k"),
            ("SEARXNG_BASE_URL", "http://searx.local/"),
        ];
        let c = ProviderConfig::from_lookup(lookup(&both)).unwrap();
        assert_eq!(c.configured(), vec![ProviderKind::Brave, ProviderKind::Searxng]);
        assert_eq!(c.searxng_base_url.as_deref(), Some("http://searx.local"));

        let mut flipped = both.to_vec();
        flipped.push(("SCOUT_PROVIDER_ORDER", "searxng-first"));
        let c = ProviderConfig::from_lookup(lookup(&flipped)).unwrap();
        assert_eq!(c.configured(), vec![ProviderKind::Searxng, ProviderKind::Brave]);
    }

    #[test]
    fn brave_key_alias_is_accepted() {
        let c = ProviderConfig::from_lookup(lookup(&[("BRAVE_SEARCH_API_KEY", "k2")])).unwrap();
        assert_eq!(c.brave_api_key.as_deref(), Some("k2"));
        assert_eq!(c.configured(), vec![ProviderKind::Brave]);
    }

    #[test]
    fn bad_searxng_url_is_rejected() {
        let err = ProviderConfig::from_lookup(lookup(&[("SEARXNG_BASE_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
        let err = ProviderConfig::from_lookup(lookup(&[("SEARXNG_BASE_URL", "ftp://x")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn numeric_knobs_are_clamped() {
        let c = ProviderConfig::from_lookup(lookup(&[
            ("SCOUT_MAX_RESULTS", "500"),
            ("SCOUT_SEARCH_TIMEOUT_MS", "5"),
        ]))
        .unwrap();
        assert_eq!(c.max_results, MAX_RESULTS_CAP);
        assert_eq!(c.timeout_ms, 1_000);

        let c = ProviderConfig::from_lookup(lookup(&[("SCOUT_MAX_RESULTS", "many")])).unwrap();
        assert_eq!(c.max_results, DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let c = ProviderConfig::from_lookup(lookup(&[("BRAVE_API_KEY", "super-secret")])).unwrap();
        let s = format!("{c:?}");
        assert!(!s.contains("super-secret"));
        assert!(s.contains("<redacted>"));
    }

    #[test]
    fn llm_defaults_to_ollama() {
        let c = LlmConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(c.provider, LlmProvider::Ollama);
        assert_eq!(c.base_url, "http://127.0.0.1:11434");
        assert_eq!(c.model, "qwen2.5:7b");
        assert!(c.api_key.is_none());
    }

    #[test]
    fn llm_remote_providers_require_a_key() {
        let err = LlmConfig::from_lookup(lookup(&[("LLM_PROVIDER", "openrouter")])).unwrap_err();
        assert!(matches!(err, Error::NotConfigured(_)));

        let c = LlmConfig::from_lookup(lookup(&[
            ("LLM_PROVIDER", "OpenRouter"),
            ("LLM_API_KEY", "sk"),
            ("LLM_CHOICE", "anthropic/claude-3.5-haiku"),
        ]))
        .unwrap();
        assert_eq!(c.provider, LlmProvider::OpenRouter);
        assert_eq!(c.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(c.model, "anthropic/claude-3.5-haiku");
    }

    #[test]
    fn unknown_llm_provider_is_an_error() {
        assert!(LlmConfig::from_lookup(lookup(&[("LLM_PROVIDER", "bard")])).is_err());
    }
}
