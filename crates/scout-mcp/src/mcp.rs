use crate::state::AppState;
use crate::tools::{self, SearchRequest};
use rmcp::{
    handler::server::router::tool::ToolRouter as RmcpToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;

fn tool_result(payload: serde_json::Value) -> CallToolResult {
    // Structured content for machine consumers, plus a text copy for clients that only
    // read `content[0].text`.
    let mut r = CallToolResult::structured(payload.clone());
    r.content = vec![Content::text(payload.to_string())];
    r
}

#[derive(Debug, Deserialize, JsonSchema, Default)]
struct WebSearchArgs {
    /// Search query (required).
    #[serde(default)]
    query: Option<String>,
    /// Maximum number of results (1..=20; server default applies when unset).
    #[serde(default)]
    max_results: Option<usize>,
    /// Optional language hint (e.g. "en").
    #[serde(default)]
    language: Option<String>,
    /// Optional country hint (e.g. "us"); Brave only.
    #[serde(default)]
    country: Option<String>,
    /// Per-provider request timeout in milliseconds (clamped to 1000..=60000).
    #[serde(default)]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema, Default)]
struct WebAnswerArgs {
    /// The user's question or message (required).
    #[serde(default)]
    query: Option<String>,
    /// When to search the web: "auto" (default, question-like messages), "always", "never".
    #[serde(default)]
    web: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema, Default)]
struct WebSummarizeArgs {
    /// Text to summarize (required).
    #[serde(default)]
    text: Option<String>,
    /// Upper bound on summary length in sentences (default 3).
    #[serde(default)]
    max_sentences: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema, Default)]
struct ScoutMetaArgs {}

#[derive(Clone)]
pub(crate) struct ScoutMcp {
    tool_router: RmcpToolRouter<Self>,
    state: AppState,
}

#[tool_router]
impl ScoutMcp {
    pub(crate) fn new(state: AppState) -> Self {
        Self {
            tool_router: Self::tool_router(),
            state,
        }
    }

    #[tool(
        description = "Search the web via the configured providers (Brave first, SearXNG fallback by default). Returns ok=false with error.code=no_provider_available when search is unavailable."
    )]
    async fn web_search(
        &self,
        params: Parameters<Option<WebSearchArgs>>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0.unwrap_or_default();
        let req = SearchRequest {
            query: args.query.unwrap_or_default(),
            max_results: args.max_results,
            language: args.language,
            country: args.country,
            timeout_ms: args.timeout_ms,
        };
        Ok(tool_result(tools::web_search_payload(&self.state, req).await))
    }

    #[tool(
        description = "Answer a message with the configured LLM, grounding it in web search results when useful (cites sources as [n])."
    )]
    async fn web_answer(
        &self,
        params: Parameters<Option<WebAnswerArgs>>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0.unwrap_or_default();
        let payload =
            tools::web_answer_payload(&self.state, args.query.unwrap_or_default(), args.web)
                .await;
        Ok(tool_result(payload))
    }

    #[tool(description = "Summarize a block of text (e.g. fetched page content) with the configured LLM.")]
    async fn web_summarize(
        &self,
        params: Parameters<Option<WebSummarizeArgs>>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0.unwrap_or_default();
        let payload = tools::summarize_payload(
            &self.state,
            args.text.unwrap_or_default(),
            args.max_sentences,
        )
        .await;
        Ok(tool_result(payload))
    }

    #[tool(description = "Report scout configuration + version (no secrets)")]
    async fn scout_meta(
        &self,
        _params: Parameters<Option<ScoutMetaArgs>>,
    ) -> Result<CallToolResult, McpError> {
        Ok(tool_result(tools::meta_payload(&self.state)))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for ScoutMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Web search for agents. Call web_search for sources (title/url/snippet + provider for citation); web_answer for a cited LLM answer; web_summarize to condense text. Outputs are JSON and schema-versioned."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub(crate) async fn serve_stdio(state: AppState) -> Result<(), McpError> {
    let svc = ScoutMcp::new(state);
    let running = svc
        .serve(stdio())
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    // Keep the stdio server alive until the client closes.
    running
        .waiting()
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::ProviderConfig;

    fn payload(r: &CallToolResult) -> serde_json::Value {
        r.structured_content.clone().expect("structured_content")
    }

    #[tokio::test]
    async fn web_search_tool_wraps_envelope() {
        let state = AppState::new(ProviderConfig::default(), Err("off".to_string())).unwrap();
        let svc = ScoutMcp::new(state);
        let r = svc
            .web_search(Parameters(Some(WebSearchArgs {
                query: Some("capital of France".to_string()),
                ..WebSearchArgs::default()
            })))
            .await
            .unwrap();
        let v = payload(&r);
        assert_eq!(v["kind"], "web_search");
        assert_eq!(v["error"]["code"], "no_provider_available");
        // Text fallback mirrors the structured payload.
        let text = r.content[0].as_text().map(|t| t.text.clone()).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap(), v);
    }

    #[tokio::test]
    async fn web_summarize_tool_reports_missing_llm() {
        let state = AppState::new(ProviderConfig::default(), Err("off".to_string())).unwrap();
        let svc = ScoutMcp::new(state);
        let r = svc
            .web_summarize(Parameters(Some(WebSummarizeArgs {
                text: Some("Rust is a systems programming language.".to_string()),
                max_sentences: Some(1),
            })))
            .await
            .unwrap();
        let v = payload(&r);
        assert_eq!(v["kind"], "web_summarize");
        assert_eq!(v["error"]["code"], "not_configured");
        assert_eq!(v["request"]["max_sentences"], 1);
    }

    #[tokio::test]
    async fn missing_params_are_invalid_not_a_protocol_error() {
        let state = AppState::new(ProviderConfig::default(), Err("off".to_string())).unwrap();
        let svc = ScoutMcp::new(state);
        let r = svc.web_search(Parameters(None)).await.unwrap();
        assert_eq!(payload(&r)["error"]["code"], "invalid_params");
    }
}
