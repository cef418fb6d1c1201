use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Logs always go to stderr: stdout carries MCP frames
/// and command output.
///
/// Filter comes from `RUST_LOG` (default `warn`, or `info` for `scout=`/`scout_local=`
/// with `verbose`). `SCOUT_LOG_FORMAT=json` switches to JSON lines.
pub(crate) fn init(verbose: bool) {
    let default_filter = if verbose {
        "warn,scout=info,scout_local=info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let json = std::env::var("SCOUT_LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    // try_init: tests and embedders may already have a subscriber installed.
    let _ = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    };
}
