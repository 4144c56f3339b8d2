use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_JSON_LOG_FILE: &str = "assistant.logs.jsonl";

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn logging_enabled() -> bool {
    std::env::var("ASSISTANT_OBSERVABILITY_ENABLED")
        .ok()
        .and_then(|value| parse_flag(&value))
        .unwrap_or(true)
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    if let Ok(level) = std::env::var("ASSISTANT_LOG_LEVEL")
        && let Ok(filter) = tracing_subscriber::EnvFilter::try_new(level)
    {
        return filter;
    }
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Installs the process-wide tracing subscriber. Later calls are no-ops.
///
/// Environment variables:
/// - `ASSISTANT_OBSERVABILITY_ENABLED`: set to `0`/`false`/`off` to disable.
/// - `ASSISTANT_LOG_LEVEL`, else `RUST_LOG`: filter directives (default `info`).
/// - `ASSISTANT_JSON_LOG_PATH`: write JSONL to this file instead of the
///   compact console format on stderr. Stdout stays free for chat output.
pub fn init_observability() {
    INIT.get_or_init(|| {
        if !logging_enabled() {
            return;
        }

        let filter = env_filter();
        if let Ok(path) = std::env::var("ASSISTANT_JSON_LOG_PATH") {
            let path = std::path::PathBuf::from(path);
            let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
                Some(parent) => {
                    let _ = std::fs::create_dir_all(parent);
                    parent.to_path_buf()
                }
                None => std::path::PathBuf::from("."),
            };
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_JSON_LOG_FILE);
            let writer = tracing_appender::rolling::never(dir, file_name);
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init();
        } else {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .try_init();
        }
    });
}
