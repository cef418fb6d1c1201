//! Small HTTP API: `POST /search` and `GET /health`.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use scout_core::{Error as ScoutError, SearchQuery};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchBody {
    pub(crate) query: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchItem {
    pub(crate) title: String,
    pub(crate) url: String,
    pub(crate) snippet: String,
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ScoutError> for ApiError {
    fn from(e: ScoutError) -> Self {
        match e {
            ScoutError::InvalidQuery(m) => Self::BadRequest(m),
            ScoutError::NoProviderAvailable(m) => Self::SearchUnavailable(m),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::BadRequest(format!("invalid request body: {}", e.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_params"),
            Self::SearchUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "no_provider_available"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "unexpected_error"),
        };
        let body = serde_json::json!({
            "error": { "code": code, "message": self.to_string() }
        });
        (status, Json(body)).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search(
    State(state): State<AppState>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<Vec<SearchItem>>, ApiError> {
    let Json(body) = body?;
    let q = SearchQuery::new(body.query)?;
    let resp = state.search(&q).await.map_err(|f| ApiError::from(f.error))?;
    Ok(Json(
        resp.results
            .into_iter()
            .map(|r| SearchItem {
                title: r.title,
                url: r.url,
                snippet: r.snippet,
            })
            .collect(),
    ))
}

pub(crate) fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/health", get(health))
        .route("/search", post(search))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "http api listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
