//! Handlers for `/discovered-songs`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/discovered-songs` | `?limit` (default 10), `?offset` (default 0); one page of sessions |
//! | `POST` | `/discovered-songs` | Body: [`RecordBody`]; `{"success":true}` |

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
};
use chrono::Utc;
use dropbox_core::{
  DiscoverySessionBuilder, PageRequest, SessionPage,
  catalog::DepositId,
  discovery::{DiscoveredType, NewDiscovery},
  store::DropboxStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, auth::Authenticated, error::ApiError};

// ─── List sessions ───────────────────────────────────────────────────────────

/// Raw pagination values; anything unparsable falls back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub limit:  Option<String>,
  pub offset: Option<String>,
}

impl ListParams {
  fn page(&self) -> PageRequest {
    let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
    PageRequest::coerce(parse(&self.limit), parse(&self.offset))
  }
}

/// `GET /discovered-songs?limit=<n>&offset=<n>`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<SessionPage>, ApiError>
where
  S: DropboxStore + 'static,
{
  let page = params.page();
  let records = state
    .store
    .list_discoveries(user.user_id, state.settings.max_discovery_events)
    .await
    .map_err(ApiError::from_store)?;
  let events = records.len();

  let builder = DiscoverySessionBuilder::new(records);
  let out = builder.page(page, Utc::now());

  tracing::debug!(
    user_id = user.user_id,
    events,
    sessions = builder.len(),
    returned = out.sessions.len(),
    offset = page.offset,
    "built discovery sessions"
  );
  Ok(Json(out))
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /discovered-songs`.
#[derive(Debug, Deserialize)]
pub struct RecordBody {
  /// A number or a numeric string.
  #[serde(default, deserialize_with = "crate::json::lenient_id")]
  pub deposit_id:      Option<DepositId>,
  /// `main` or `revealed`; anything else is treated as `revealed`.
  pub discovered_type: Option<String>,
}

/// `POST /discovered-songs`
pub async fn record<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  body: Result<Json<RecordBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DropboxStore + 'static,
{
  let Json(body) = body?;
  let deposit_id = body
    .deposit_id
    .ok_or_else(|| ApiError::BadRequest("deposit_id is required".into()))?;
  let kind = DiscoveredType::coerce(body.discovered_type.as_deref());

  state
    .store
    .record_discovery(NewDiscovery::new(user.user_id, deposit_id, kind))
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(user_id = user.user_id, deposit_id, %kind, "discovery recorded");
  Ok(Json(json!({ "success": true })))
}
