//! Provider selection with sequential fallback.
//!
//! The selector holds the configured providers in attempt order. Each search walks that
//! list front to back, returning the first success. Provider-level failures move on to the
//! next provider; when the list is empty or exhausted the caller gets
//! `Error::NoProviderAvailable`, never an empty success.

use crate::search::{BraveSearchProvider, SearxngSearchProvider};
use scout_core::{
    Error, ProviderAttempt, ProviderConfig, ProviderKind, Result, SearchProvider, SearchQuery,
    SearchResponse,
};
use std::sync::Arc;
use std::time::Instant;

/// A failed selection, with every provider attempt that led to it.
#[derive(Debug)]
pub struct SearchFailure {
    pub error: Error,
    pub attempts: Vec<ProviderAttempt>,
}

impl From<SearchFailure> for Error {
    fn from(f: SearchFailure) -> Self {
        f.error
    }
}

#[derive(Clone)]
pub struct ProviderSelector {
    providers: Vec<Arc<dyn SearchProvider>>,
}

impl ProviderSelector {
    /// Providers are attempted in the order given.
    pub fn new(providers: Vec<Arc<dyn SearchProvider>>) -> Self {
        Self { providers }
    }

    pub fn from_config(cfg: &ProviderConfig, client: reqwest::Client) -> Result<Self> {
        let mut providers: Vec<Arc<dyn SearchProvider>> = Vec::new();
        for kind in cfg.configured() {
            match kind {
                ProviderKind::Brave => providers.push(Arc::new(BraveSearchProvider::from_config(
                    client.clone(),
                    cfg,
                )?)),
                ProviderKind::Searxng => providers.push(Arc::new(
                    SearxngSearchProvider::from_config(client.clone(), cfg)?,
                )),
            }
        }
        tracing::debug!(
            order = cfg.order.as_str(),
            providers = ?providers.iter().map(|p| p.kind().as_str()).collect::<Vec<_>>(),
            "search providers configured"
        );
        Ok(Self::new(providers))
    }

    pub fn providers(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub async fn search(&self, q: &SearchQuery) -> Result<SearchResponse> {
        self.search_traced(q).await.map_err(Error::from)
    }

    /// Like [`search`](Self::search), but keeps the attempt log on failure.
    pub async fn search_traced(
        &self,
        q: &SearchQuery,
    ) -> std::result::Result<SearchResponse, SearchFailure> {
        if q.query.trim().is_empty() {
            return Err(SearchFailure {
                error: Error::InvalidQuery("query must be non-empty".to_string()),
                attempts: Vec::new(),
            });
        }
        if self.providers.is_empty() {
            return Err(SearchFailure {
                error: Error::NoProviderAvailable(
                    "no search provider configured (set BRAVE_API_KEY or SEARXNG_BASE_URL)"
                        .to_string(),
                ),
                attempts: Vec::new(),
            });
        }

        let t_all = Instant::now();
        let mut attempts: Vec<ProviderAttempt> = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let kind = provider.kind();
            let t0 = Instant::now();
            match provider.search(q).await {
                Ok(mut resp) => {
                    attempts.push(ProviderAttempt {
                        provider: kind,
                        ok: true,
                        elapsed_ms: t0.elapsed().as_millis(),
                        error_code: None,
                        message: None,
                    });
                    resp.attempts = attempts;
                    resp.timings_ms
                        .insert("total".to_string(), t_all.elapsed().as_millis());
                    tracing::info!(
                        provider = kind.as_str(),
                        results = resp.results.len(),
                        attempts = resp.attempts.len(),
                        "web search served"
                    );
                    return Ok(resp);
                }
                Err(e) if e.is_provider_error() => {
                    tracing::warn!(
                        provider = kind.as_str(),
                        code = e.code(),
                        error = %e,
                        "search provider failed; falling back"
                    );
                    attempts.push(ProviderAttempt {
                        provider: kind,
                        ok: false,
                        elapsed_ms: t0.elapsed().as_millis(),
                        error_code: Some(e.code().to_string()),
                        message: Some(e.to_string()),
                    });
                }
                Err(e) => return Err(SearchFailure { error: e, attempts }),
            }
        }

        let summary = attempts
            .iter()
            .map(|a| {
                format!(
                    "{}: {}",
                    a.provider,
                    a.message.as_deref().unwrap_or("failed")
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        Err(SearchFailure {
            error: Error::NoProviderAvailable(format!("all configured providers failed ({summary})")),
            attempts,
        })
    }
}
