use crate::ollama::OllamaClient;
use crate::openai_compat::OpenAiCompatClient;
use scout_core::{ChatBackend, LlmConfig, LlmProvider, Result};
use std::sync::Arc;

/// Build the chat backend selected by `LLM_PROVIDER`.
pub fn chat_backend_from_config(
    client: reqwest::Client,
    cfg: &LlmConfig,
) -> Result<Arc<dyn ChatBackend>> {
    let backend: Arc<dyn ChatBackend> = match cfg.provider {
        LlmProvider::OpenAi | LlmProvider::OpenRouter => {
            Arc::new(OpenAiCompatClient::from_config(client, cfg)?)
        }
        LlmProvider::Ollama => Arc::new(OllamaClient::from_config(client, cfg)?),
    };
    tracing::debug!(
        backend = backend.name(),
        model = backend.model(),
        "llm backend configured"
    );
    Ok(backend)
}
