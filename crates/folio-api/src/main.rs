//! folio-server binary.
//!
//! Loads `.env`, reads `config.toml` (or the path given with `--config`),
//! opens the SQLite history store and serves the portfolio chat API over HTTP.
//!
//! ```
//! OPENROUTER_API_KEY=sk-or-... cargo run -p folio-api --bin folio-server
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use folio_api::{AppState, ServerConfig, config::expand_tilde};
use folio_core::{prompt::PromptAssembler, resume::Resume};
use folio_store_sqlite::SqliteStore;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Folio portfolio chat server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// OpenRouter API key.
  #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Preferred model, tried before the configured fallbacks.
  #[arg(long, env = "AI_MODEL")]
  model: Option<String>,

  /// SQLite database path; overrides `store_path` from the config file.
  #[arg(long)]
  store_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // A missing .env is fine.
  dotenvy::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  if let Some(key) = cli.api_key {
    server_cfg.upstream.api_key = Some(SecretString::from(key));
  }
  if let Some(model) = cli.model {
    server_cfg.upstream.default_model = model;
  }
  if let Some(path) = cli.store_path {
    server_cfg.store_path = path;
  }

  let store_path = server_cfg
    .prepare_store_path()
    .with_context(|| format!("failed to prepare store directory for {:?}", server_cfg.store_path))?;
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let resume = match &server_cfg.resume_path {
    Some(path) => Resume::from_path(expand_tilde(path))
      .with_context(|| format!("failed to load resume from {path:?}"))?,
    None => Resume::embedded().context("embedded resume is invalid")?,
  };
  let prompt = PromptAssembler::new(&resume).context("failed to render system prompt")?;

  let relay = server_cfg
    .upstream
    .build_relay()
    .context("failed to build upstream client")?;
  match &relay {
    Some(dispatcher) => tracing::info!(
      models = ?dispatcher.candidates().iter().collect::<Vec<_>>(),
      "upstream relay configured"
    ),
    None => tracing::warn!("OPENROUTER_API_KEY is not set; /api/chat will answer 500"),
  }

  let state = AppState {
    store:         Arc::new(store),
    relay:         relay.map(Arc::new),
    prompt:        Arc::new(prompt),
    resume:        Arc::new(resume),
    history_limit: server_cfg.history_limit,
  };

  let app = folio_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
