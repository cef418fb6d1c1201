//! Process-wide state built once at startup and shared by every surface.

use scout_core::{
    Error as ScoutError, GenerateOptions, LlmConfig, ProviderConfig, ProviderKind, SearchQuery,
};
use scout_local::{Answer, Assistant, ProviderSelector, SearchFailure, WebMode};
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) providers: Arc<ProviderConfig>,
    pub(crate) selector: Arc<ProviderSelector>,
    llm: Result<(Arc<LlmConfig>, Assistant), String>,
}

impl AppState {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        let providers = ProviderConfig::from_env()?;
        // LLM settings only matter for answering; keep search usable without them.
        let llm = LlmConfig::from_env().map_err(|e| e.to_string());
        Self::new(providers, llm)
    }

    pub(crate) fn new(
        providers: ProviderConfig,
        llm: Result<LlmConfig, String>,
    ) -> anyhow::Result<Self> {
        let client = scout_local::http_client()?;
        let selector = Arc::new(ProviderSelector::from_config(&providers, client.clone())?);
        if selector.is_empty() {
            tracing::warn!("no search provider configured; web_search will report no_provider_available");
        }

        let llm = match llm {
            Ok(cfg) => match scout_local::llm::chat_backend_from_config(client, &cfg) {
                Ok(backend) => {
                    let opts = GenerateOptions {
                        timeout_ms: cfg.timeout_ms,
                        ..GenerateOptions::default()
                    };
                    let assistant = Assistant::new(selector.clone(), backend).with_options(opts);
                    Ok((Arc::new(cfg), assistant))
                }
                Err(e) => Err(e.to_string()),
            },
            Err(e) => Err(e),
        };
        if let Err(e) = &llm {
            tracing::info!(error = %e, "llm backend unavailable; answering disabled");
        }

        Ok(Self {
            providers: Arc::new(providers),
            selector,
            llm,
        })
    }

    pub(crate) async fn search(
        &self,
        q: &SearchQuery,
    ) -> Result<scout_core::SearchResponse, SearchFailure> {
        self.selector.search_traced(q).await
    }

    pub(crate) async fn answer(&self, message: &str, mode: WebMode) -> Result<Answer, ScoutError> {
        match &self.llm {
            Ok((_, assistant)) => assistant.answer(message, mode).await,
            Err(e) => Err(ScoutError::NotConfigured(e.clone())),
        }
    }

    pub(crate) async fn summarize(
        &self,
        text: &str,
        max_sentences: usize,
    ) -> Result<String, ScoutError> {
        match &self.llm {
            Ok((_, assistant)) => assistant.summarize(text, max_sentences).await,
            Err(e) => Err(ScoutError::NotConfigured(e.clone())),
        }
    }

    /// Configuration summary with booleans in place of secrets.
    pub(crate) fn describe(&self) -> serde_json::Value {
        let p = &self.providers;
        serde_json::json!({
            "providers": {
                "brave": p.is_configured(ProviderKind::Brave),
                "searxng": p.is_configured(ProviderKind::Searxng),
                "order": p.order.as_str(),
                "attempt_order": self.selector.providers(),
                "max_results": p.max_results,
                "timeout_ms": p.timeout_ms,
            },
            "llm": match &self.llm {
                Ok((cfg, _)) => serde_json::json!({
                    "configured": true,
                    "provider": cfg.provider.as_str(),
                    "model": cfg.model,
                    "base_url": cfg.base_url,
                    "api_key": cfg.api_key.is_some(),
                }),
                Err(e) => serde_json::json!({
                    "configured": false,
                    "error": e,
                }),
            },
        })
    }
}
