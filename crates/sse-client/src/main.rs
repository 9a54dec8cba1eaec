//! sse: searchable-encryption client
//!
//! Commands:
//!   upload --file <path> [--doc-id <id>] [--keywords <kw>...]
//!   search --keyword <kw>
//!   health
//!   keys init | keys regenerate --yes

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use sse_client::{HttpTransport, KeywordExtractor, SimpleExtractor, SseClient};
use sse_core::config::{expand_tilde, ClientConfig, SseConfig};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sse",
    version,
    about = "Searchable encryption client",
    long_about = "sse: encrypt documents locally, index them under keyed tokens, and search them on an ssed server"
)]
struct Cli {
    /// Path to sse.toml configuration file
    #[arg(long, short = 'c', env = "SSE_CONFIG", default_value = "sse.toml")]
    config: PathBuf,

    /// Server base URL (overrides client.server_url)
    #[arg(long, env = "SSE_SERVER")]
    server: Option<String>,

    /// Key bundle file (overrides client.key_file)
    #[arg(long, env = "SSE_KEYS")]
    keys: Option<PathBuf>,

    /// Log level for diagnostics on stderr
    #[arg(long, env = "SSE_LOG", default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a file and upload it with its keyword tokens
    Upload {
        /// File to upload
        #[arg(long, short = 'f')]
        file: PathBuf,
        /// Document id (default: <file name>-<size in bytes>)
        #[arg(long)]
        doc_id: Option<String>,
        /// Keywords to index under; omitted or bare, they are extracted
        /// from the file text
        #[arg(long, short = 'k', num_args = 0..)]
        keywords: Vec<String>,
    },

    /// Search for one keyword and print every decrypted hit
    Search {
        #[arg(long, short = 'k')]
        keyword: String,
    },

    /// Check that the server is up
    Health,

    /// Client key bundle management
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
}

#[derive(Subcommand, Debug)]
enum KeysAction {
    /// Create the key bundle if it does not exist yet
    Init,
    /// Replace the key bundle with fresh keys
    ///
    /// Everything uploaded under the old keys becomes unsearchable and
    /// undecryptable from this client.
    Regenerate {
        /// Confirm that old uploads will be lost
        #[arg(long)]
        yes: bool,
    },
}

// ── Entry point ────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let mut config = SseConfig::load(&cli.config)?.client;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(keys) = cli.keys {
        config.key_file = keys;
    }
    let key_path = expand_tilde(&config.key_file);

    match cli.command {
        Commands::Upload {
            file,
            doc_id,
            keywords,
        } => cmd_upload(&config, &key_path, &file, doc_id, keywords).await,
        Commands::Search { keyword } => cmd_search(&config, &key_path, &keyword).await,
        Commands::Health => cmd_health(&config).await,
        Commands::Keys {
            action: KeysAction::Init,
        } => cmd_keys_init(&key_path),
        Commands::Keys {
            action: KeysAction::Regenerate { yes },
        } => cmd_keys_regenerate(&key_path, yes),
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn connect(config: &ClientConfig, key_path: &Path) -> Result<SseClient<HttpTransport>> {
    let keys = sse_crypto::load_or_create(key_path)
        .with_context(|| format!("loading keys: {}", key_path.display()))?;
    let transport = HttpTransport::new(
        &config.server_url,
        Duration::from_secs(config.timeout_secs),
    )?;
    Ok(SseClient::new(keys, transport))
}

/// `<file name>-<size>`, e.g. `a.txt-120`
fn default_doc_id(path: &Path, len: usize) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    format!("{name}-{len}")
}

// ── `sse upload` ───────────────────────────────────────────────────────────────

async fn cmd_upload(
    config: &ClientConfig,
    key_path: &Path,
    file: &Path,
    doc_id: Option<String>,
    keywords: Vec<String>,
) -> Result<()> {
    let plaintext =
        std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let doc_id = doc_id.unwrap_or_else(|| default_doc_id(file, plaintext.len()));

    let keywords = if keywords.is_empty() {
        let extractor = SimpleExtractor {
            min_len: config.min_keyword_len,
        };
        extractor.extract(&String::from_utf8_lossy(&plaintext))
    } else {
        keywords
    };
    if keywords.is_empty() {
        eprintln!("warning: no keywords; {doc_id} will be stored but never found by search");
    }

    let client = connect(config, key_path)?;
    let resp = client
        .upload(&doc_id, &plaintext, &keywords)
        .await
        .with_context(|| format!("uploading {}", file.display()))?;

    println!("Uploaded {} → {}", file.display(), client.transport().base_url());
    println!("  doc_id:  {}", resp.stored_doc_id);
    println!("  bytes:   {}", plaintext.len());
    println!("  tokens:  {}", resp.token_count);
    Ok(())
}

// ── `sse search` ───────────────────────────────────────────────────────────────

async fn cmd_search(config: &ClientConfig, key_path: &Path, keyword: &str) -> Result<()> {
    let client = connect(config, key_path)?;
    let hits = client.search(keyword).await.context("search failed")?;

    println!("{} hit(s) for {keyword:?}", hits.len());
    let mut failed = 0;
    for hit in hits {
        println!("--- hit {} ---", hit.index + 1);
        match hit.plaintext {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => println!("{text}"),
                Err(e) => println!("<binary data length={}>", e.as_bytes().len()),
            },
            Err(e) => {
                failed += 1;
                println!("<could not decrypt: {e}>");
            }
        }
    }

    if failed > 0 {
        eprintln!("warning: {failed} hit(s) could not be decrypted");
    }
    Ok(())
}

// ── `sse health` ───────────────────────────────────────────────────────────────

async fn cmd_health(config: &ClientConfig) -> Result<()> {
    let transport = HttpTransport::new(
        &config.server_url,
        Duration::from_secs(config.timeout_secs),
    )?;
    let ok = sse_client::Transport::health(&transport)
        .await
        .with_context(|| format!("contacting {}", config.server_url))?
        .ok;

    if !ok {
        bail!("{} reports unhealthy", config.server_url);
    }
    println!("{}: ok", config.server_url);
    Ok(())
}

// ── `sse keys` ─────────────────────────────────────────────────────────────────

fn cmd_keys_init(key_path: &Path) -> Result<()> {
    let existed = key_path.exists();
    sse_crypto::load_or_create(key_path)
        .with_context(|| format!("loading keys: {}", key_path.display()))?;

    if existed {
        println!("Key bundle already present: {}", key_path.display());
    } else {
        println!("Created key bundle: {}", key_path.display());
    }
    Ok(())
}

fn cmd_keys_regenerate(key_path: &Path, yes: bool) -> Result<()> {
    if !yes {
        bail!(
            "regenerating keys makes every earlier upload unsearchable and undecryptable; \
             re-run with --yes to confirm"
        );
    }
    sse_crypto::regenerate(key_path)
        .with_context(|| format!("writing keys: {}", key_path.display()))?;
    println!("Regenerated key bundle: {}", key_path.display());
    Ok(())
}
