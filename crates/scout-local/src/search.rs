use crate::normalize;
use scout_core::config::{clamp_max_results, clamp_search_timeout_ms};
use scout_core::{
    Error, ProviderConfig, ProviderKind, Result, SearchProvider, SearchQuery, SearchResponse,
};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const BRAVE_DEFAULT_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Map a reqwest transport/body error onto the provider error taxonomy.
fn transport_error(provider: ProviderKind, e: reqwest::Error, timeout_ms: u64) -> Error {
    if e.is_timeout() {
        Error::ProviderTimeout {
            provider,
            timeout_ms,
        }
    } else if e.is_decode() {
        Error::ProviderMalformedResponse {
            provider,
            message: e.to_string(),
        }
    } else {
        Error::ProviderUnreachable {
            provider,
            message: e.to_string(),
        }
    }
}

fn status_error(provider: ProviderKind, status: reqwest::StatusCode) -> Error {
    match status.as_u16() {
        401 | 403 => Error::ProviderUnauthorized {
            provider,
            status: status.as_u16(),
        },
        s => Error::ProviderStatus {
            provider,
            status: s,
        },
    }
}

/// Send a prepared GET, check the status, and normalize the body.
async fn execute(
    provider: ProviderKind,
    req: reqwest::RequestBuilder,
    timeout_ms: u64,
    max_results: usize,
) -> Result<SearchResponse> {
    let t0 = Instant::now();
    let resp = req
        .timeout(Duration::from_millis(timeout_ms))
        .send()
        .await
        .map_err(|e| transport_error(provider, e, timeout_ms))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(status_error(provider, status));
    }
    let body = resp
        .bytes()
        .await
        .map_err(|e| transport_error(provider, e, timeout_ms))?;
    let results = normalize::results_for(provider, &body, max_results)?;

    let mut timings_ms = BTreeMap::new();
    timings_ms.insert(provider.as_str().to_string(), t0.elapsed().as_millis());
    tracing::debug!(
        provider = provider.as_str(),
        results = results.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "search provider responded"
    );

    Ok(SearchResponse {
        results,
        provider,
        attempts: Vec::new(),
        timings_ms,
    })
}

#[derive(Debug, Clone)]
pub struct BraveSearchProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    default_max_results: usize,
    default_timeout_ms: u64,
}

impl BraveSearchProvider {
    pub fn from_config(client: reqwest::Client, cfg: &ProviderConfig) -> Result<Self> {
        let api_key = cfg
            .brave_api_key
            .clone()
            .ok_or_else(|| Error::NotConfigured("missing BRAVE_API_KEY".to_string()))?;
        Ok(Self {
            client,
            api_key,
            endpoint: cfg
                .brave_endpoint
                .clone()
                .unwrap_or_else(|| BRAVE_DEFAULT_ENDPOINT.to_string()),
            default_max_results: cfg.max_results,
            default_timeout_ms: cfg.timeout_ms,
        })
    }
}

#[async_trait::async_trait]
impl SearchProvider for BraveSearchProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Brave
    }

    async fn search(&self, q: &SearchQuery) -> Result<SearchResponse> {
        let max_results = clamp_max_results(q.max_results.unwrap_or(self.default_max_results));
        let timeout_ms = clamp_search_timeout_ms(q.timeout_ms.unwrap_or(self.default_timeout_ms));

        let mut req = self
            .client
            .get(&self.endpoint)
            .header("X-Subscription-Token", &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("q", q.query.as_str())])
            .query(&[("count", max_results.to_string())]);
        if let Some(lang) = q.language.as_deref() {
            req = req.query(&[("search_lang", lang)]);
        }
        if let Some(country) = q.country.as_deref() {
            req = req.query(&[("country", country)]);
        }

        execute(ProviderKind::Brave, req, timeout_ms, max_results).await
    }
}

#[derive(Debug, Clone)]
pub struct SearxngSearchProvider {
    client: reqwest::Client,
    base_url: String,
    default_max_results: usize,
    default_timeout_ms: u64,
}

impl SearxngSearchProvider {
    pub fn from_config(client: reqwest::Client, cfg: &ProviderConfig) -> Result<Self> {
        let base_url = cfg
            .searxng_base_url
            .clone()
            .ok_or_else(|| Error::NotConfigured("missing SEARXNG_BASE_URL".to_string()))?;
        Ok(Self {
            client,
            base_url,
            default_max_results: cfg.max_results,
            default_timeout_ms: cfg.timeout_ms,
        })
    }

    fn endpoint_search(&self) -> String {
        // Accept either a base URL (…/), or a full /search endpoint.
        let mut base = self.base_url.trim().trim_end_matches('/').to_string();
        if !base.ends_with("/search") {
            base.push_str("/search");
        }
        base
    }
}

#[async_trait::async_trait]
impl SearchProvider for SearxngSearchProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Searxng
    }

    async fn search(&self, q: &SearchQuery) -> Result<SearchResponse> {
        let max_results = clamp_max_results(q.max_results.unwrap_or(self.default_max_results));
        let timeout_ms = clamp_search_timeout_ms(q.timeout_ms.unwrap_or(self.default_timeout_ms));

        let mut req = self
            .client
            .get(self.endpoint_search())
            .query(&[("q", q.query.as_str()), ("format", "json")])
            .query(&[("num", max_results.to_string())]);
        if let Some(lang) = q.language.as_deref() {
            req = req.query(&[("language", lang)]);
        }

        execute(ProviderKind::Searxng, req, timeout_ms, max_results).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn searxng(base: &str) -> SearxngSearchProvider {
        SearxngSearchProvider {
            client: reqwest::Client::new(),
            base_url: base.to_string(),
            default_max_results: 5,
            default_timeout_ms: 10_000,
        }
    }

    #[test]
    fn searxng_endpoint_accepts_base_or_full_search_url() {
        assert_eq!(searxng("http://a").endpoint_search(), "http://a/search");
        assert_eq!(searxng("http://a/").endpoint_search(), "http://a/search");
        assert_eq!(searxng("http://a/search/").endpoint_search(), "http://a/search");
        assert_eq!(searxng("http://a/searx").endpoint_search(), "http://a/searx/search");
    }

    #[test]
    fn auth_statuses_are_classified_as_unauthorized() {
        let e = status_error(ProviderKind::Brave, reqwest::StatusCode::UNAUTHORIZED);
        assert!(matches!(e, Error::ProviderUnauthorized { status: 401, .. }));
        let e = status_error(ProviderKind::Brave, reqwest::StatusCode::FORBIDDEN);
        assert!(matches!(e, Error::ProviderUnauthorized { status: 403, .. }));
        let e = status_error(ProviderKind::Searxng, reqwest::StatusCode::TOO_MANY_REQUESTS);
        assert!(matches!(e, Error::ProviderStatus { status: 429, .. }));
    }

    #[test]
    fn from_config_requires_credentials() {
        let cfg = ProviderConfig::default();
        assert!(matches!(
            BraveSearchProvider::from_config(reqwest::Client::new(), &cfg),
            Err(Error::NotConfigured(_))
        ));
        assert!(matches!(
            SearxngSearchProvider::from_config(reqwest::Client::new(), &cfg),
            Err(Error::NotConfigured(_))
        ));
    }
}
