//! HTTP server wiring for the dropbox backend.
//!
//! Loads [`ServerConfig`] and wraps the [`dropbox_api`] router with
//! request tracing.

use std::path::{Path, PathBuf};

use axum::Router;
use dropbox_api::{ApiSettings, AppState, api_router};
use dropbox_core::store::DropboxStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DROPBOX_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub reveal_cost:          i64,
  pub deposit_reward:       i64,
  pub max_discovery_events: Option<usize>,
  pub user_deposits_limit:  usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let api = ApiSettings::default();
    Self {
      host:                 "127.0.0.1".to_string(),
      port:                 8000,
      store_path:           PathBuf::from("dropbox.sqlite3"),
      reveal_cost:          api.reveal_cost,
      deposit_reward:       api.deposit_reward,
      max_discovery_events: api.max_discovery_events,
      user_deposits_limit:  api.user_deposits_limit,
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `DROPBOX_*` variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("DROPBOX"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings {
      reveal_cost:          self.reveal_cost,
      deposit_reward:       self.deposit_reward,
      max_discovery_events: self.max_discovery_events,
      user_deposits_limit:  self.user_deposits_limit,
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The API router with a per-request tracing span.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: DropboxStore + 'static,
{
  api_router(state).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::{io::Write as _, sync::Arc};

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use dropbox_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/dropbox-config.toml")).unwrap();
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.reveal_cost, 100);
    assert_eq!(cfg.deposit_reward, 50);
    assert_eq!(cfg.max_discovery_events, None);
    assert_eq!(cfg.user_deposits_limit, 500);
  }

  #[test]
  fn file_values_override_defaults() {
    let path = std::env::temp_dir().join(format!("dropbox-cfg-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    let toml = "port = 9100\nreveal_cost = 25\ndeposit_reward = 10\nmax_discovery_events = 1000";
    writeln!(file, "{toml}").unwrap();
    drop(file);

    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.address(), "127.0.0.1:9100");
    let api = cfg.api_settings();
    assert_eq!(api.reveal_cost, 25);
    assert_eq!(api.deposit_reward, 10);
    assert_eq!(api.max_discovery_events, Some(1000));
    assert_eq!(api.user_deposits_limit, 500);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/db.sqlite3")), PathBuf::from(home).join("db.sqlite3"));
    assert_eq!(expand_tilde(Path::new("/abs/db")), PathBuf::from("/abs/db"));
  }

  #[tokio::test]
  async fn traced_app_serves_api_routes() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = AppState::new(Arc::new(store), ServerConfig::default().api_settings());

    let req = Request::builder().uri("/meta").body(Body::empty()).unwrap();
    let resp = app(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
