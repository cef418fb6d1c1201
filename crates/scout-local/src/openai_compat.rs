use scout_core::{ChatBackend, Error, GenerateOptions, LlmConfig, LlmProvider, Result};
use serde::{Deserialize, Serialize};

/// Client for OpenAI-compatible `/chat/completions` endpoints (OpenAI, OpenRouter, ...).
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    name: &'static str,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiCompatClient {
    pub fn from_config(client: reqwest::Client, cfg: &LlmConfig) -> Result<Self> {
        if cfg.provider == LlmProvider::Ollama {
            return Err(Error::NotConfigured(
                "ollama is not an openai-compatible provider here".to_string(),
            ));
        }
        if cfg.api_key.is_none() {
            return Err(Error::NotConfigured(format!(
                "missing LLM_API_KEY for {}",
                cfg.provider.as_str()
            )));
        }
        Ok(Self {
            client,
            name: cfg.provider.as_str(),
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }

    fn endpoint_chat_completions(&self) -> String {
        // Base URLs carry the API version (…/v1, …/api/v1).
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub async fn chat(&self, user: &str, opts: &GenerateOptions) -> Result<String> {
        let messages = vec![Message {
            role: "user".to_string(),
            content: user.to_string(),
        }];
        let req = ChatCompletionsRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(opts.max_tokens),
            temperature: Some(opts.temperature),
            stream: Some(false),
        };

        let mut rb = self
            .client
            .post(self.endpoint_chat_completions())
            .timeout(std::time::Duration::from_millis(opts.timeout_ms))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(k) = &self.api_key {
            rb = rb.header(reqwest::header::AUTHORIZATION, format!("Bearer {k}"));
        }

        let resp = rb
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Llm(format!(
                "{} chat.completions HTTP {status}",
                self.name
            )));
        }

        let parsed: ChatCompletionsResponse =
            resp.json().await.map_err(|e| Error::Llm(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Llm(format!("{} returned no choices", self.name)))
    }
}

#[async_trait::async_trait]
impl ChatBackend for OpenAiCompatClient {
    fn name(&self) -> &'static str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, opts: &GenerateOptions) -> Result<String> {
        self.chat(prompt, opts).await
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    // Null when the model answered with a tool call only.
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_chat_completion() {
        let js = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Paris [1]"}}]}"#;
        let parsed: ChatCompletionsResponse = serde_json::from_str(js).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Paris [1]")
        );
    }

    #[test]
    fn endpoint_joins_versioned_base() {
        let cfg = LlmConfig {
            provider: LlmProvider::OpenRouter,
            api_key: Some("k".to_string()),
            base_url: "https://openrouter.ai/api/v1/".to_string(),
            model: "m".to_string(),
            timeout_ms: 1_000,
        };
        let c = OpenAiCompatClient::from_config(reqwest::Client::new(), &cfg).unwrap();
        assert_eq!(
            c.endpoint_chat_completions(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(c.name(), "openrouter");
    }

    #[test]
    fn request_omits_unset_knobs() {
        let req = ChatCompletionsRequest {
            model: "m".to_string(),
            messages: vec![],
            max_tokens: None,
            temperature: Some(0.7),
            stream: None,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("max_tokens").is_none());
        assert!(v.get("stream").is_none());
        assert_eq!(v["temperature"], 0.7);
    }
}
