//! JSON result envelopes shared by the MCP tools and CLI commands.

use scout_core::Error as ScoutError;
use serde::Serialize;

pub(crate) const SCHEMA_VERSION: u64 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidParams,
    NotConfigured,
    NoProviderAvailable,
    LlmFailed,
    UnexpectedError,
}

impl ErrorCode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::InvalidParams => "invalid_params",
            Self::NotConfigured => "not_configured",
            Self::NoProviderAvailable => "no_provider_available",
            Self::LlmFailed => "llm_failed",
            Self::UnexpectedError => "unexpected_error",
        }
    }

    pub(crate) fn retryable(self) -> bool {
        match self {
            // Providers may come back; the call itself was fine.
            Self::NoProviderAvailable | Self::LlmFailed => true,
            Self::InvalidParams | Self::NotConfigured | Self::UnexpectedError => false,
        }
    }

    pub(crate) fn hint(self) -> &'static str {
        match self {
            Self::InvalidParams => "Pass a non-empty query.",
            Self::NotConfigured => {
                "Check LLM_PROVIDER / LLM_API_KEY / LLM_BASE_URL / LLM_CHOICE in the server environment."
            }
            Self::NoProviderAvailable => {
                "Search is unavailable. Set BRAVE_API_KEY and/or SEARXNG_BASE_URL, or retry later if a provider is down."
            }
            Self::LlmFailed => "The LLM backend failed; check that it is reachable and the model exists.",
            Self::UnexpectedError => "",
        }
    }
}

impl From<&ScoutError> for ErrorCode {
    fn from(e: &ScoutError) -> Self {
        match e {
            ScoutError::InvalidQuery(_) => Self::InvalidParams,
            ScoutError::NoProviderAvailable(_) => Self::NoProviderAvailable,
            ScoutError::NotConfigured(_) | ScoutError::InvalidUrl(_) => Self::NotConfigured,
            ScoutError::Llm(_) => Self::LlmFailed,
            // The selector absorbs provider errors; seeing one here means it leaked.
            _ => Self::UnexpectedError,
        }
    }
}

pub(crate) fn add_envelope_fields(payload: &mut serde_json::Value, kind: &str, elapsed_ms: u128) {
    payload["schema_version"] = serde_json::json!(SCHEMA_VERSION);
    payload["kind"] = serde_json::json!(kind);
    payload["elapsed_ms"] = serde_json::json!(elapsed_ms);
    // Keep ubiquitous keys present so clients never branch on "missing vs null".
    if payload.get("attempts").is_none() {
        payload["attempts"] = serde_json::Value::Null;
    }
    if payload.get("request").is_none() {
        payload["request"] = serde_json::Value::Null;
    }
}

pub(crate) fn error_obj(code: ErrorCode, message: impl ToString) -> serde_json::Value {
    #[derive(Serialize)]
    struct ErrorObject {
        code: &'static str,
        message: String,
        hint: &'static str,
        retryable: bool,
    }

    let e = ErrorObject {
        code: code.as_str(),
        message: message.to_string(),
        hint: code.hint(),
        retryable: code.retryable(),
    };
    serde_json::to_value(e).unwrap_or_else(|_| {
        serde_json::json!({
            "code": code.as_str(),
            "message": message.to_string(),
            "hint": code.hint(),
            "retryable": code.retryable()
        })
    })
}

pub(crate) fn error_from(e: &ScoutError) -> serde_json::Value {
    error_obj(ErrorCode::from(e), e)
}
