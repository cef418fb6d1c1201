use anyhow::Result;
use clap::{Parser, Subcommand};

mod envelope;
mod http;
mod logging;
#[cfg(feature = "stdio")]
mod mcp;
mod state;
mod tools;

use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(about = "Web search for LLM agents (Brave/SearXNG with fallback)", long_about = None)]
struct Cli {
    /// Log provider attempts and fallbacks at info level (stderr).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as an MCP stdio server (for Cursor / MCP clients).
    #[cfg(feature = "stdio")]
    McpStdio,
    /// Run one web search and print the result envelope.
    Search(SearchCmd),
    /// Answer a message with the configured LLM, searching the web when useful.
    Ask(AskCmd),
    /// Summarize text (argument or stdin) with the configured LLM.
    Summarize(SummarizeCmd),
    /// Serve the HTTP API (POST /search, GET /health).
    Serve(ServeCmd),
    /// Diagnose configuration (json; no secrets, no network).
    Doctor(DoctorCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct SearchCmd {
    /// Search query.
    query: String,
    #[arg(long)]
    max_results: Option<usize>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    country: Option<String>,
    /// Per-provider timeout (ms).
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct AskCmd {
    /// The message to answer.
    query: String,
    /// When to search the web: auto|always|never
    #[arg(long, default_value = "auto")]
    web: String,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct SummarizeCmd {
    /// Text to summarize; read from stdin when omitted or "-".
    text: Option<String>,
    /// Upper bound on summary length in sentences.
    #[arg(long, default_value_t = tools::DEFAULT_SUMMARY_SENTENCES)]
    max_sentences: usize,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "text")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct ServeCmd {
    /// Listen address.
    #[arg(long, env = "SCOUT_HTTP_ADDR", default_value = "0.0.0.0:8135")]
    addr: std::net::SocketAddr,
}

#[derive(clap::Args, Debug)]
struct DoctorCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

fn env_flag_off(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
        .unwrap_or(false)
}

/// Load a `.env`-style file before anything reads the environment.
///
/// `SCOUT_ENV_FILE` names an explicit file; otherwise `./.env` is loaded unless
/// `SCOUT_DOTENV=0`. Existing process variables always win.
fn load_env_file() -> Option<(String, bool)> {
    if let Some(p) = std::env::var("SCOUT_ENV_FILE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        let ok = dotenvy::from_path(&p).is_ok();
        return Some((p, ok));
    }
    if env_flag_off("SCOUT_DOTENV") {
        return None;
    }
    dotenvy::dotenv()
        .ok()
        .map(|p| (p.display().to_string(), true))
}

fn print_search_text(v: &serde_json::Value) {
    if v["ok"].as_bool() != Some(true) {
        println!(
            "search unavailable: {}",
            v["error"]["message"].as_str().unwrap_or("unknown error")
        );
        return;
    }
    println!("provider: {}", v["provider"].as_str().unwrap_or(""));
    if let Some(rs) = v["results"].as_array() {
        for (i, r) in rs.iter().enumerate() {
            println!("{}. {}", i + 1, r["title"].as_str().unwrap_or("No title"));
            println!("   {}", r["url"].as_str().unwrap_or(""));
            let snippet = r["snippet"].as_str().unwrap_or("");
            if !snippet.is_empty() {
                println!("   {snippet}");
            }
        }
    }
}

fn doctor_payload(t0: std::time::Instant) -> serde_json::Value {
    let mut checks: Vec<serde_json::Value> = Vec::new();
    let mut configured = serde_json::Value::Null;

    match AppState::from_env() {
        Ok(state) => {
            configured = state.describe();
            checks.push(serde_json::json!({
                "name": "provider_config",
                "ok": true,
                "message": "provider configuration parsed",
            }));
            let any = !state.selector.is_empty();
            checks.push(serde_json::json!({
                "name": "search_provider_available",
                "ok": any,
                "message": if any { "at least one search provider is configured" } else { "no search provider configured" },
                "hint": if any { "" } else { "Set BRAVE_API_KEY and/or SEARXNG_BASE_URL." },
            }));
            let llm_ok = configured["llm"]["configured"].as_bool() == Some(true);
            checks.push(serde_json::json!({
                "name": "llm_config",
                "ok": llm_ok,
                "message": if llm_ok { "llm backend configured" } else { "llm backend unavailable (web_answer/ask disabled)" },
                "hint": if llm_ok { "" } else { "Set LLM_PROVIDER (openai|openrouter|ollama), LLM_API_KEY, LLM_CHOICE." },
            }));
        }
        Err(e) => checks.push(serde_json::json!({
            "name": "provider_config",
            "ok": false,
            "message": e.to_string(),
            "hint": "Fix SEARXNG_BASE_URL / SCOUT_BRAVE_ENDPOINT / SCOUT_PROVIDER_ORDER.",
        })),
    }

    let ok = checks
        .iter()
        .filter(|c| c["name"] != "llm_config")
        .all(|c| c["ok"].as_bool() == Some(true));
    let mut v = serde_json::json!({
        "ok": ok,
        "name": "scout",
        "version": env!("CARGO_PKG_VERSION"),
        "features": { "stdio": cfg!(feature = "stdio") },
        "configured": configured,
        "checks": checks,
    });
    envelope::add_envelope_fields(&mut v, "doctor", t0.elapsed().as_millis());
    v
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = load_env_file();
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Some((path, ok)) = env_file {
        if ok {
            tracing::debug!(path = %path, "loaded env file");
        } else {
            tracing::warn!(path = %path, "could not load env file");
        }
    }

    match cli.command {
        #[cfg(feature = "stdio")]
        Commands::McpStdio => {
            let state = AppState::from_env()?;
            mcp::serve_stdio(state)
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        }
        Commands::Search(args) => {
            let state = AppState::from_env()?;
            let req = tools::SearchRequest {
                query: args.query,
                max_results: args.max_results,
                language: args.language,
                country: args.country,
                timeout_ms: args.timeout_ms,
            };
            let v = tools::web_search_payload(&state, req).await;
            match args.output.to_ascii_lowercase().as_str() {
                "text" => print_search_text(&v),
                _ => println!("{v}"),
            }
            if v["ok"].as_bool() != Some(true) {
                std::process::exit(2);
            }
        }
        Commands::Ask(args) => {
            let state = AppState::from_env()?;
            let v = tools::web_answer_payload(&state, args.query, Some(args.web)).await;
            match args.output.to_ascii_lowercase().as_str() {
                "json" => println!("{v}"),
                _ => {
                    if v["ok"].as_bool() == Some(true) {
                        println!("{}", v["answer"].as_str().unwrap_or("").trim());
                        if let Some(sources) = v["sources"].as_array() {
                            if !sources.is_empty() {
                                println!();
                                for (i, s) in sources.iter().enumerate() {
                                    println!(
                                        "[{}] {} - {}",
                                        i + 1,
                                        s["title"].as_str().unwrap_or(""),
                                        s["url"].as_str().unwrap_or("")
                                    );
                                }
                            }
                        }
                        if let Some(ws) = v["warnings"].as_array() {
                            for w in ws {
                                eprintln!("warning: {}", w["message"].as_str().unwrap_or(""));
                            }
                        }
                    } else {
                        eprintln!(
                            "error: {}",
                            v["error"]["message"].as_str().unwrap_or("unknown error")
                        );
                    }
                }
            }
            if v["ok"].as_bool() != Some(true) {
                std::process::exit(2);
            }
        }
        Commands::Summarize(args) => {
            let text = match args.text.as_deref() {
                Some(t) if t != "-" => t.to_string(),
                _ => {
                    let mut buf = String::new();
                    std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)?;
                    buf
                }
            };
            let state = AppState::from_env()?;
            let v = tools::summarize_payload(&state, text, Some(args.max_sentences)).await;
            match args.output.to_ascii_lowercase().as_str() {
                "json" => println!("{v}"),
                _ => {
                    if v["ok"].as_bool() == Some(true) {
                        println!("{}", v["summary"].as_str().unwrap_or(""));
                    } else {
                        eprintln!(
                            "error: {}",
                            v["error"]["message"].as_str().unwrap_or("unknown error")
                        );
                    }
                }
            }
            if v["ok"].as_bool() != Some(true) {
                std::process::exit(2);
            }
        }
        Commands::Serve(args) => {
            let state = AppState::from_env()?;
            http::serve(state, args.addr).await?;
        }
        Commands::Doctor(args) => {
            let v = doctor_payload(std::time::Instant::now());
            match args.output.to_ascii_lowercase().as_str() {
                "text" => {
                    for c in v["checks"].as_array().into_iter().flatten() {
                        let mark = if c["ok"].as_bool() == Some(true) { "ok  " } else { "FAIL" };
                        println!(
                            "{mark} {}: {}",
                            c["name"].as_str().unwrap_or(""),
                            c["message"].as_str().unwrap_or("")
                        );
                    }
                }
                _ => println!("{v}"),
            }
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "scout",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("scout {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{v}"),
            }
        }
    }

    Ok(())
}
