use axum::{routing::get, Router};
use rmcp::{
    model::CallToolRequestParam,
    service::{RoleClient, RunningService, ServiceExt},
    transport::{ConfigureCommandExt, TokioChildProcess},
};
use std::net::SocketAddr;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn call(
    service: &RunningService<RoleClient, ()>,
    name: &'static str,
    args: serde_json::Value,
) -> serde_json::Value {
    let r = service
        .call_tool(CallToolRequestParam {
            name: name.to_string().into(),
            arguments: Some(args.as_object().cloned().unwrap()),
        })
        .await
        .expect("call_tool");
    r.structured_content
        .clone()
        .expect("expected structured_content")
}

fn hermetic(cmd: &mut tokio::process::Command) {
    cmd.args(["mcp-stdio"]);
    // Disable `.env` autoload so this test stays hermetic.
    cmd.env("SCOUT_DOTENV", "0");
    cmd.env_remove("SCOUT_ENV_FILE");
    cmd.env_remove("BRAVE_API_KEY");
    cmd.env_remove("BRAVE_SEARCH_API_KEY");
    cmd.env_remove("SEARXNG_BASE_URL");
    cmd.env_remove("SCOUT_PROVIDER_ORDER");
    cmd.env_remove("LLM_PROVIDER");
    cmd.env("RUST_LOG", "error");
}

#[tokio::test]
async fn tool_surface_lists_search_answer_summarize_and_meta() {
    let bin = assert_cmd::cargo::cargo_bin!("scout");
    let service = ()
        .serve(
            TokioChildProcess::new(tokio::process::Command::new(bin).configure(hermetic))
                .expect("spawn mcp child"),
        )
        .await
        .expect("serve mcp child");

    let tools = service.list_tools(Default::default()).await.expect("list_tools");
    let mut names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["scout_meta", "web_answer", "web_search", "web_summarize"]);

    service.cancel().await.expect("cancel");
}

#[tokio::test]
async fn no_provider_is_reported_without_crashing() {
    let bin = assert_cmd::cargo::cargo_bin!("scout");
    let service = ()
        .serve(
            TokioChildProcess::new(tokio::process::Command::new(bin).configure(hermetic))
                .expect("spawn mcp child"),
        )
        .await
        .expect("serve mcp child");

    let v = call(
        &service,
        "web_search",
        serde_json::json!({ "query": "capital of France" }),
    )
    .await;
    assert_eq!(v["ok"].as_bool(), Some(false));
    assert_eq!(v["error"]["code"].as_str(), Some("no_provider_available"));
    assert_eq!(v["attempts"], serde_json::json!([]));

    // The server is still alive after a failed search.
    let meta = call(&service, "scout_meta", serde_json::json!({})).await;
    assert_eq!(meta["configured"]["providers"]["brave"].as_bool(), Some(false));

    service.cancel().await.expect("cancel");
}

#[tokio::test]
async fn searxng_only_search_via_stdio_server() {
    let app = Router::new().route(
        "/search",
        get(|| async {
            axum::Json(serde_json::json!({
                "results": [
                    {"url": "https://example.com/paris", "title": "Paris", "content": "Capital of France"},
                    {"url": "https://example.com/france", "title": "France", "content": "Country in Europe"}
                ]
            }))
        }),
    );
    let addr = serve(app).await;
    let endpoint = format!("http://{addr}");

    let bin = assert_cmd::cargo::cargo_bin!("scout");
    let service = ()
        .serve(
            TokioChildProcess::new(tokio::process::Command::new(bin).configure(|cmd| {
                hermetic(cmd);
                cmd.env("SEARXNG_BASE_URL", &endpoint);
            }))
            .expect("spawn mcp child"),
        )
        .await
        .expect("serve mcp child");

    let v = call(
        &service,
        "web_search",
        serde_json::json!({ "query": "capital of France", "max_results": 1 }),
    )
    .await;
    assert_eq!(v["ok"].as_bool(), Some(true));
    assert_eq!(v["provider"].as_str(), Some("searxng"));
    assert_eq!(v["schema_version"].as_u64(), Some(1));
    let results = v["results"].as_array().expect("results array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["url"].as_str(), Some("https://example.com/paris"));
    assert_eq!(results[0]["snippet"].as_str(), Some("Capital of France"));

    service.cancel().await.expect("cancel");
}

#[tokio::test]
async fn brave_failure_falls_back_to_searxng_via_stdio_server() {
    let brave = Router::new().route(
        "/res/v1/web/search",
        get(|| async { (axum::http::StatusCode::UNAUTHORIZED, "invalid token") }),
    );
    let brave_addr = serve(brave).await;
    let searx = Router::new().route(
        "/search",
        get(|| async {
            axum::Json(serde_json::json!({
                "results": [{"url": "https://example.com/a", "title": "A", "content": "alpha"}]
            }))
        }),
    );
    let searx_addr = serve(searx).await;

    let bin = assert_cmd::cargo::cargo_bin!("scout");
    let service = ()
        .serve(
            TokioChildProcess::new(tokio::process::Command::new(bin).configure(|cmd| {
                hermetic(cmd);
                cmd.env("BRAVE_API_KEY", "expired");
                cmd.env(
                    "SCOUT_BRAVE_ENDPOINT",
                    format!("http://{brave_addr}/res/v1/web/search"),
                );
                cmd.env("SEARXNG_BASE_URL", format!("http://{searx_addr}"));
            }))
            .expect("spawn mcp child"),
        )
        .await
        .expect("serve mcp child");

    let v = call(&service, "web_search", serde_json::json!({ "query": "hello" })).await;
    assert_eq!(v["ok"].as_bool(), Some(true));
    assert_eq!(v["provider"].as_str(), Some("searxng"));
    let attempts = v["attempts"].as_array().expect("attempts");
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0]["provider"].as_str(), Some("brave"));
    assert_eq!(
        attempts[0]["error_code"].as_str(),
        Some("provider_unauthorized")
    );
    assert_eq!(attempts[1]["ok"].as_bool(), Some(true));

    service.cancel().await.expect("cancel");
}
