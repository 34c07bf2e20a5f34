//! dropbox server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and serves the JSON API over HTTP.
//!
//! # Creating users
//!
//! ```sh
//! cargo run -p dropbox-server -- --add-user alice
//! ```

use std::{
  io::{self, BufRead, Write},
  path::PathBuf,
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use dropbox_api::{AppState, auth::hash_password};
use dropbox_core::{store::DropboxStore, user::NewUser};
use dropbox_server::{ServerConfig, app, expand_tilde};
use dropbox_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Music dropbox API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Create a user with a password entered on stdin and exit.
  #[arg(long, value_name = "USERNAME")]
  add_user: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let server_cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(username) = cli.add_user {
    let password = read_password()?;
    let mut input = NewUser::new(&username);
    input.password_hash =
      Some(hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?);
    let user = store
      .add_user(input)
      .await
      .with_context(|| format!("failed to create user {username:?}"))?;
    tracing::info!(user_id = user.user_id, %username, "created user");
    return Ok(());
  }

  let state = AppState::new(Arc::new(store), server_cfg.api_settings());
  let address = server_cfg.address();

  tracing::info!(
    reveal_cost = server_cfg.reveal_cost,
    deposit_reward = server_cfg.deposit_reward,
    max_discovery_events = ?server_cfg.max_discovery_events,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(state)).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
