//! Transport-independent tool bodies. The MCP server and the CLI both call these, so
//! their JSON output stays identical.

use crate::envelope::{add_envelope_fields, error_from, error_obj, ErrorCode};
use crate::state::AppState;
use scout_core::SearchQuery;
use scout_local::WebMode;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchRequest {
    pub(crate) query: String,
    pub(crate) max_results: Option<usize>,
    pub(crate) language: Option<String>,
    pub(crate) country: Option<String>,
    pub(crate) timeout_ms: Option<u64>,
}

impl SearchRequest {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "query": self.query,
            "max_results": self.max_results,
            "language": self.language,
            "country": self.country,
            "timeout_ms": self.timeout_ms,
        })
    }
}

pub(crate) async fn web_search_payload(state: &AppState, req: SearchRequest) -> serde_json::Value {
    let t0 = std::time::Instant::now();
    let request = req.to_json();

    let mut payload = match SearchQuery::new(req.query) {
        Err(e) => serde_json::json!({
            "ok": false,
            "request": request,
            "error": error_from(&e),
        }),
        Ok(mut q) => {
            q.max_results = req.max_results;
            q.language = req.language;
            q.country = req.country;
            q.timeout_ms = req.timeout_ms;
            match state.search(&q).await {
                Ok(resp) => serde_json::json!({
                    "ok": true,
                    "provider": resp.provider,
                    "query": q.query,
                    "results": resp.results,
                    "attempts": resp.attempts,
                    "timings_ms": resp.timings_ms,
                    "request": request,
                }),
                Err(failure) => serde_json::json!({
                    "ok": false,
                    "provider": serde_json::Value::Null,
                    "results": [],
                    "attempts": failure.attempts,
                    "request": request,
                    "error": error_from(&failure.error),
                }),
            }
        }
    };
    add_envelope_fields(&mut payload, "web_search", t0.elapsed().as_millis());
    payload
}

pub(crate) async fn web_answer_payload(
    state: &AppState,
    query: String,
    web: Option<String>,
) -> serde_json::Value {
    let t0 = std::time::Instant::now();
    let request = serde_json::json!({ "query": &query, "web": &web });

    let mode = match web.as_deref().map(str::parse::<WebMode>).transpose() {
        Ok(m) => m.unwrap_or_default(),
        Err(e) => {
            let mut payload = serde_json::json!({
                "ok": false,
                "request": request,
                "error": error_obj(ErrorCode::InvalidParams, e),
            });
            add_envelope_fields(&mut payload, "web_answer", t0.elapsed().as_millis());
            return payload;
        }
    };

    let mut payload = match state.answer(&query, mode).await {
        Ok(answer) => {
            let mut v = serde_json::json!({
                "ok": true,
                "answer": answer.text,
                "backend": answer.backend,
                "model": answer.model,
                "searched": answer.searched,
                "request": request,
            });
            if let Some(s) = answer.search {
                v["provider"] = serde_json::json!(s.provider);
                v["sources"] = serde_json::json!(s.results);
                v["attempts"] = serde_json::json!(s.attempts);
            }
            if let Some(e) = answer.search_error {
                v["warnings"] = serde_json::json!([{ "code": e.code, "message": e.message }]);
            }
            v
        }
        Err(e) => serde_json::json!({
            "ok": false,
            "request": request,
            "error": error_from(&e),
        }),
    };
    add_envelope_fields(&mut payload, "web_answer", t0.elapsed().as_millis());
    payload
}

/// Sentence budget when the caller does not give one.
pub(crate) const DEFAULT_SUMMARY_SENTENCES: usize = 3;

pub(crate) async fn summarize_payload(
    state: &AppState,
    text: String,
    max_sentences: Option<usize>,
) -> serde_json::Value {
    let t0 = std::time::Instant::now();
    let max_sentences = max_sentences.unwrap_or(DEFAULT_SUMMARY_SENTENCES).max(1);
    let request = serde_json::json!({
        "text_chars": text.chars().count(),
        "max_sentences": max_sentences,
    });

    let mut payload = match state.summarize(&text, max_sentences).await {
        Ok(summary) => serde_json::json!({
            "ok": true,
            "summary": summary.trim(),
            "request": request,
        }),
        Err(e) => serde_json::json!({
            "ok": false,
            "request": request,
            "error": error_from(&e),
        }),
    };
    add_envelope_fields(&mut payload, "web_summarize", t0.elapsed().as_millis());
    payload
}

pub(crate) fn meta_payload(state: &AppState) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "ok": true,
        "name": "scout",
        "version": env!("CARGO_PKG_VERSION"),
        "configured": state.describe(),
        "features": { "stdio": cfg!(feature = "stdio") },
    });
    add_envelope_fields(&mut payload, "scout_meta", 0);
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::ProviderConfig;

    fn unconfigured() -> AppState {
        AppState::new(ProviderConfig::default(), Err("LLM disabled in test".to_string())).unwrap()
    }

    #[tokio::test]
    async fn unconfigured_search_is_an_error_envelope_not_a_crash() {
        let v = web_search_payload(
            &unconfigured(),
            SearchRequest {
                query: "capital of France".to_string(),
                ..SearchRequest::default()
            },
        )
        .await;
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"]["code"], "no_provider_available");
        assert_eq!(v["attempts"], serde_json::json!([]));
        assert_eq!(v["kind"], "web_search");
        assert_eq!(v["request"]["query"], "capital of France");
    }

    #[tokio::test]
    async fn empty_query_is_invalid_params() {
        let v = web_search_payload(&unconfigured(), SearchRequest::default()).await;
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"]["code"], "invalid_params");
        assert!(v["attempts"].is_null());
    }

    #[tokio::test]
    async fn answer_without_llm_is_not_configured() {
        let v = web_answer_payload(&unconfigured(), "who are you".to_string(), None).await;
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"]["code"], "not_configured");
        assert!(v["error"]["message"]
            .as_str()
            .unwrap()
            .contains("LLM disabled in test"));
    }

    #[tokio::test]
    async fn answer_rejects_unknown_web_mode() {
        let v = web_answer_payload(
            &unconfigured(),
            "hi".to_string(),
            Some("sometimes".to_string()),
        )
        .await;
        assert_eq!(v["error"]["code"], "invalid_params");
    }

    #[tokio::test]
    async fn summarize_without_llm_is_not_configured() {
        let v = summarize_payload(&unconfigured(), "Some long text.".to_string(), None).await;
        assert_eq!(v["ok"], false);
        assert_eq!(v["kind"], "web_summarize");
        assert_eq!(v["error"]["code"], "not_configured");
        assert_eq!(v["request"]["max_sentences"], 3);
        assert_eq!(v["request"]["text_chars"], 15);
    }

    #[test]
    fn meta_never_leaks_secrets() {
        let cfg = ProviderConfig {
            brave_api_key: Some("brv-secret".to_string()),
            ..ProviderConfig::default()
        };
        let state = AppState::new(cfg, Err("off".to_string())).unwrap();
        let v = meta_payload(&state);
        assert_eq!(v["configured"]["providers"]["brave"], true);
        assert!(!v.to_string().contains("brv-secret"));
    }
}
