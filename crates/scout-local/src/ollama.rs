use scout_core::{ChatBackend, Error, GenerateOptions, LlmConfig, LlmProvider, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn from_config(client: reqwest::Client, cfg: &LlmConfig) -> Result<Self> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(Error::NotConfigured(format!(
                "LLM_PROVIDER={} is not ollama",
                cfg.provider.as_str()
            )));
        }
        Ok(Self {
            client,
            base_url: cfg.base_url.clone(),
            model: cfg.model.clone(),
        })
    }

    fn endpoint_chat(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    pub async fn chat(&self, user: &str, opts: &GenerateOptions) -> Result<String> {
        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            stream: Some(false),
            options: Some(ChatOptions {
                num_predict: opts.max_tokens,
                temperature: opts.temperature,
            }),
        };

        let resp = self
            .client
            .post(self.endpoint_chat())
            .timeout(std::time::Duration::from_millis(opts.timeout_ms))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Llm(format!("ollama chat HTTP {status}")));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| Error::Llm(e.to_string()))?;
        Ok(parsed.message.content)
    }
}

#[async_trait::async_trait]
impl ChatBackend for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, opts: &GenerateOptions) -> Result<String> {
        self.chat(prompt, opts).await
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Debug, Clone, Serialize)]
struct ChatOptions {
    num_predict: u64,
    temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}
