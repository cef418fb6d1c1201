//! Search-then-answer loop: optionally run a web search, then ask the LLM.

use crate::prompt;
use crate::selector::ProviderSelector;
use scout_core::{ChatBackend, Error, GenerateOptions, Result, SearchQuery, SearchResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// When the assistant should consult the web.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebMode {
    /// Search when the message looks like a factual question.
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for WebMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" | "on" | "true" => Ok(Self::Always),
            "never" | "off" | "false" => Ok(Self::Never),
            other => Err(Error::InvalidQuery(format!(
                "unknown web mode: {other} (allowed: auto, always, never)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchErrorInfo {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub backend: String,
    pub model: String,
    pub searched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchResponse>,
    /// Set when a search was wanted but no provider could serve it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_error: Option<SearchErrorInfo>,
}

#[derive(Clone)]
pub struct Assistant {
    selector: Arc<ProviderSelector>,
    llm: Arc<dyn ChatBackend>,
    opts: GenerateOptions,
}

impl Assistant {
    pub fn new(selector: Arc<ProviderSelector>, llm: Arc<dyn ChatBackend>) -> Self {
        Self {
            selector,
            llm,
            opts: GenerateOptions::default(),
        }
    }

    pub fn with_options(mut self, opts: GenerateOptions) -> Self {
        self.opts = opts;
        self
    }

    pub async fn answer(&self, message: &str, mode: WebMode) -> Result<Answer> {
        let q = SearchQuery::new(message)?;
        let wants_search = match mode {
            WebMode::Auto => prompt::needs_web_search(message),
            WebMode::Always => true,
            WebMode::Never => false,
        };

        let mut search = None;
        let mut search_error = None;
        if wants_search {
            match self.selector.search(&q).await {
                Ok(resp) => search = Some(resp),
                Err(e) => {
                    // Degrade to a plain answer; the caller still sees why search was skipped.
                    tracing::warn!(code = e.code(), error = %e, "web search unavailable");
                    search_error = Some(SearchErrorInfo {
                        code: e.code().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let text_prompt = match search.as_ref() {
            Some(resp) if !resp.results.is_empty() => {
                prompt::web_aware_prompt(message, &resp.results)
            }
            _ => prompt::plain_prompt(message),
        };
        let text = self.llm.generate(&text_prompt, &self.opts).await?;

        Ok(Answer {
            text,
            backend: self.llm.name().to_string(),
            model: self.llm.model().to_string(),
            searched: search.is_some(),
            search,
            search_error,
        })
    }

    /// Summarize `text` in at most `max_sentences` sentences (at least one).
    pub async fn summarize(&self, text: &str, max_sentences: usize) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::InvalidQuery("text must be non-empty".to_string()));
        }
        let p = prompt::summarize_prompt(text.trim(), max_sentences.max(1));
        self.llm.generate(&p, &self.opts).await
    }
}
