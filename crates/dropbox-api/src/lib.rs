//! JSON HTTP API for the dropbox backend.
//!
//! Exposes an axum [`Router`] backed by any [`DropboxStore`]. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = dropbox_api::api_router(AppState::new(store, settings));
//! ```

pub mod account;
pub mod auth;
pub mod boxes;
pub mod discoveries;
pub mod error;
pub mod json;
pub mod reveal;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use dropbox_core::store::DropboxStore;
use serde::Deserialize;

pub use error::ApiError;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Knobs the handlers need at request time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
  /// Points debited by `POST /reveal-song`, also quoted on box teasers.
  pub reveal_cost:          i64,
  /// Points credited to a signed-in user for each `POST /get-box` deposit.
  pub deposit_reward:       i64,
  /// Only the most recent N discoveries feed the session builder when set.
  pub max_discovery_events: Option<usize>,
  /// Cap on `GET /user-deposits`.
  pub user_deposits_limit:  usize,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      reveal_cost:          100,
      deposit_reward:       50,
      max_discovery_events: None,
      user_deposits_limit:  500,
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub settings: Arc<ApiSettings>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, settings: ApiSettings) -> Self {
    Self { store, settings: Arc::new(settings) }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), settings: Arc::clone(&self.settings) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: DropboxStore + 'static,
{
  Router::new()
    .route(
      "/discovered-songs",
      get(discoveries::list::<S>).post(discoveries::record::<S>),
    )
    .route("/reveal-song", post(reveal::reveal::<S>))
    .route("/get-box", get(boxes::get_box::<S>).post(boxes::deposit::<S>))
    .route("/meta", get(boxes::meta::<S>))
    .route("/user-deposits", get(account::deposits::<S>))
    .route("/points", get(account::points::<S>))
    .with_state(state)
}
