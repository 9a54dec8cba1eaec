//! ssed: searchable-encryption index server
//!
//! Usage:
//!   ssed [--config sse.toml] [--listen 127.0.0.1:8000] [--data-dir ./data]

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use sse_core::config::SseConfig;

#[derive(Parser, Debug)]
#[command(name = "ssed", version, about = "Searchable encryption index server")]
struct Cli {
    /// Path to sse.toml configuration file
    #[arg(long, short = 'c', env = "SSE_CONFIG", default_value = "sse.toml")]
    config: PathBuf,

    /// Listen address (overrides server.listen)
    #[arg(long, env = "SSE_LISTEN")]
    listen: Option<String>,

    /// Data directory (overrides server.data_dir)
    #[arg(long, env = "SSE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SSE_LOG")]
    log: Option<String>,

    /// Log format (json, text)
    #[arg(long, env = "SSE_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SseConfig::load(&cli.config)?.server;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let level = cli.log.unwrap_or_else(|| config.log_level.clone());
    let format = cli.log_format.unwrap_or(match config.log_format.as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    });
    init_logging(&level, &format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "ssed starting"
    );

    sse_server::server::run(config).await
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // doc_id / token fields sit at the top level of each JSON line
    let output = match format {
        LogFormat::Json => fmt::layer().json().flatten_event(true).boxed(),
        LogFormat::Text => fmt::layer().with_target(false).boxed(),
    };
    tracing_subscriber::registry().with(output).with(filter).init();
}
