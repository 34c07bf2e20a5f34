//! Handlers for boxes and their contents.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/meta` | `?name=<slug>`; box metadata and deposit count |
//! | `GET`  | `/get-box` | `?name=<slug>`; adds the recent deposits and the reveal cost |
//! | `POST` | `/get-box` | Body: [`DepositBody`]; deposits a song, rewarding signed-in users |
//!
//! `/get-box` accepts anonymous requests. Signed-in viewers see older
//! deposits they have discovered in full; everyone else gets teasers.

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
};
use chrono::Utc;
use dropbox_core::{
  catalog::{DepositId, MusicBox, NewDeposit, NewSong},
  render::{BoxDeposit, render_box_deposits, render_deposit},
  store::DropboxStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// How many of a box's latest deposits `GET /get-box` lists.
const RECENT_DEPOSITS: usize = 10;

/// `platform_id` values naming where a deposited song's URL points.
const PLATFORM_SPOTIFY: i64 = 1;
const PLATFORM_DEEZER: i64 = 2;

#[derive(Debug, Deserialize)]
pub struct BoxParams {
  /// The box's URL slug.
  pub name: Option<String>,
}

async fn find_box<S>(state: &AppState<S>, name: Option<&str>) -> Result<MusicBox, ApiError>
where
  S: DropboxStore + 'static,
{
  let name = name
    .filter(|n| !n.is_empty())
    .ok_or_else(|| ApiError::BadRequest("box name is required".into()))?;

  state
    .store
    .get_box_by_url(name)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("box {name:?} not found")))
}

// ─── Meta ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MetaResponse {
  #[serde(rename = "box")]
  pub music_box:     MusicBox,
  pub deposit_count: u64,
}

/// `GET /meta?name=<slug>`
pub async fn meta<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<BoxParams>,
) -> Result<Json<MetaResponse>, ApiError>
where
  S: DropboxStore + 'static,
{
  let music_box = find_box(&state, params.name.as_deref()).await?;
  let deposit_count = state
    .store
    .count_box_deposits(music_box.box_id)
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(MetaResponse { music_box, deposit_count }))
}

// ─── Box contents ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BoxResponse {
  pub deposit_count: u64,
  #[serde(rename = "box")]
  pub music_box:     MusicBox,
  /// Newest first; only the first is always shown in full.
  pub deposits:      Vec<BoxDeposit>,
  pub reveal_cost:   i64,
}

/// `GET /get-box?name=<slug>`
pub async fn get_box<S>(
  State(state): State<AppState<S>>,
  viewer: Option<Authenticated>,
  Query(params): Query<BoxParams>,
) -> Result<Json<BoxResponse>, ApiError>
where
  S: DropboxStore + 'static,
{
  let music_box = find_box(&state, params.name.as_deref()).await?;
  let store = &state.store;

  let deposit_count = store
    .count_box_deposits(music_box.box_id)
    .await
    .map_err(ApiError::from_store)?;
  let details = store
    .list_box_deposits(music_box.box_id, RECENT_DEPOSITS)
    .await
    .map_err(ApiError::from_store)?;

  let discovered = match &viewer {
    Some(Authenticated(user)) if details.len() > 1 => {
      let older: Vec<DepositId> = details[1..].iter().map(|d| d.deposit.deposit_id).collect();
      store
        .find_discoveries(user.user_id, &older)
        .await
        .map_err(ApiError::from_store)?
    }
    _ => Vec::new(),
  };

  let reveal_cost = state.settings.reveal_cost;
  let deposits = render_box_deposits(&details, &discovered, reveal_cost, Utc::now());

  tracing::debug!(
    box_id = music_box.box_id,
    listed = deposits.len(),
    discovered = discovered.len(),
    signed_in = viewer.is_some(),
    "rendered box"
  );
  Ok(Json(BoxResponse { deposit_count, music_box, deposits, reveal_cost }))
}

// ─── Deposit ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /get-box`.
#[derive(Debug, Deserialize)]
pub struct DepositBody {
  /// The box's URL slug.
  #[serde(rename = "boxName")]
  pub box_name: Option<String>,
  pub option:   Option<SongChoice>,
}

/// The song being deposited, as picked from a streaming platform search.
#[derive(Debug, Default, Deserialize)]
pub struct SongChoice {
  pub name:        Option<String>,
  pub artist:      Option<String>,
  /// `1` for Spotify, `2` for Deezer; selects which field `url` fills.
  #[serde(default, deserialize_with = "crate::json::lenient_id")]
  pub platform_id: Option<i64>,
  pub url:         Option<String>,
  pub image_url:   Option<String>,
  /// Seconds.
  pub duration:    Option<u32>,
}

impl SongChoice {
  fn into_new_song(self) -> Result<NewSong, ApiError> {
    let title = self.name.as_deref().map(str::trim).unwrap_or_default();
    let artist = self.artist.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() || artist.is_empty() {
      return Err(ApiError::BadRequest("song title and artist are required".into()));
    }

    let mut song = NewSong::new(title, artist);
    song.image_url = self.image_url.filter(|u| !u.is_empty());
    song.duration = self.duration.unwrap_or_default();
    match (self.platform_id, self.url.filter(|u| !u.is_empty())) {
      (Some(PLATFORM_SPOTIFY), Some(url)) => song.spotify_url = Some(url),
      (Some(PLATFORM_DEEZER), Some(url)) => song.deezer_url = Some(url),
      _ => {}
    }
    Ok(song)
  }
}

#[derive(Debug, Serialize)]
pub struct DepositResponse {
  pub added_deposit:  BoxDeposit,
  /// The depositor's balance after the reward; `null` when anonymous.
  pub points_balance: Option<i64>,
}

/// `POST /get-box`
///
/// The song is matched to an existing one by title and artist or created.
/// Signed-in users are credited the configured deposit reward; a failed
/// credit is logged and leaves `points_balance` null without undoing the
/// deposit.
pub async fn deposit<S>(
  State(state): State<AppState<S>>,
  viewer: Option<Authenticated>,
  body: Result<Json<DepositBody>, JsonRejection>,
) -> Result<Json<DepositResponse>, ApiError>
where
  S: DropboxStore + 'static,
{
  let Json(body) = body?;
  let music_box = find_box(&state, body.box_name.as_deref()).await?;
  let input = body.option.unwrap_or_default().into_new_song()?;
  let user_id = viewer.map(|Authenticated(user)| user.user_id);
  let store = &state.store;

  let song = store.upsert_song(input).await.map_err(ApiError::from_store)?;
  let created = store
    .add_deposit(NewDeposit::new(music_box.box_id, song.song_id, user_id))
    .await
    .map_err(ApiError::from_store)?;
  let detail = store
    .get_deposit(created.deposit_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("deposit {} not found", created.deposit_id)))?;

  let points_balance = match user_id {
    Some(uid) => match store.add_points(uid, state.settings.deposit_reward).await {
      Ok(balance) => Some(balance),
      Err(e) => {
        tracing::warn!(user_id = uid, error = %e, "failed to credit deposit reward");
        None
      }
    },
    None => None,
  };

  tracing::info!(
    box_id = music_box.box_id,
    deposit_id = created.deposit_id,
    song_id = song.song_id,
    ?user_id,
    "deposit added"
  );
  Ok(Json(DepositResponse {
    added_deposit: render_deposit(&detail, Utc::now()),
    points_balance,
  }))
}
