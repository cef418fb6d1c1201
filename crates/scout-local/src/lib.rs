//! reqwest-backed implementations of the `scout-core` traits.

use scout_core::{Error, Result};

pub mod assistant;
pub mod llm;
pub mod normalize;
pub mod ollama;
pub mod openai_compat;
pub mod prompt;
pub mod search;
pub mod selector;

pub use assistant::{Answer, Assistant, WebMode};
pub use selector::{ProviderSelector, SearchFailure};

/// Shared HTTP client (one connection pool per process).
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("scout/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::NotConfigured(format!("http client: {e}")))
}
