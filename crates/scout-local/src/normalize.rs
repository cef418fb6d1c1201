//! Provider JSON -> common `SearchResult` records.
//!
//! These are pure functions over the raw response body: no IO, no clock. They keep the
//! provider's relevance order, drop entries that carry no URL (nothing to cite) or that
//! do not decode, and stop once `max_results` records have been kept. Only a body whose
//! outer shape is wrong is reported as malformed.

use scout_core::{Error, ProviderKind, Result, SearchResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BraveWebSearchResponse {
    web: Option<BraveWeb>,
    // Some Brave response variants put the list at the top level.
    results: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    results: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct SearxngSearchResponse {
    results: Option<Vec<serde_json::Value>>,
}

/// Superset of the per-result fields both providers use.
#[derive(Debug, Deserialize)]
struct RawResult {
    url: Option<String>,
    title: Option<String>,
    // Brave: `description`. SearXNG: `content`.
    description: Option<String>,
    content: Option<String>,
    // Not always numeric in the wild; read leniently.
    score: Option<serde_json::Value>,
}

impl RawResult {
    fn into_result(self) -> Option<SearchResult> {
        let url = self.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
        Some(SearchResult {
            title: self.title.unwrap_or_default(),
            snippet: self.description.or(self.content).unwrap_or_default(),
            url,
            score: self.score.as_ref().and_then(|v| v.as_f64()),
        })
    }
}

fn keep(
    provider: ProviderKind,
    items: Vec<serde_json::Value>,
    max_results: usize,
) -> Vec<SearchResult> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match serde_json::from_value::<RawResult>(v) {
            Ok(raw) => raw.into_result(),
            Err(e) => {
                tracing::debug!(
                    provider = %provider,
                    index = i,
                    error = %e,
                    "dropping undecodable result"
                );
                None
            }
        })
        .take(max_results)
        .collect()
}

fn malformed(provider: ProviderKind, e: serde_json::Error) -> Error {
    Error::ProviderMalformedResponse {
        provider,
        message: e.to_string(),
    }
}

/// Normalize a Brave web search body.
pub fn brave_results(body: &[u8], max_results: usize) -> Result<Vec<SearchResult>> {
    let parsed: BraveWebSearchResponse =
        serde_json::from_slice(body).map_err(|e| malformed(ProviderKind::Brave, e))?;
    let items = parsed
        .web
        .and_then(|w| w.results)
        .or(parsed.results)
        .unwrap_or_default();
    Ok(keep(ProviderKind::Brave, items, max_results))
}

/// Normalize a SearXNG `format=json` body.
pub fn searxng_results(body: &[u8], max_results: usize) -> Result<Vec<SearchResult>> {
    let parsed: SearxngSearchResponse =
        serde_json::from_slice(body).map_err(|e| malformed(ProviderKind::Searxng, e))?;
    Ok(keep(
        ProviderKind::Searxng,
        parsed.results.unwrap_or_default(),
        max_results,
    ))
}

pub fn results_for(provider: ProviderKind, body: &[u8], max_results: usize) -> Result<Vec<SearchResult>> {
    match provider {
        ProviderKind::Brave => brave_results(body, max_results),
        ProviderKind::Searxng => searxng_results(body, max_results),
    }
}
