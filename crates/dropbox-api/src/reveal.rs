//! `POST /reveal-song`: pay points to unlock a deposit's song.
//!
//! A reveal is charged at most once per user and deposit. Revealing a
//! deposit the user has already discovered (by reveal or as a box's main
//! deposit) makes no charge and returns the song with the unchanged balance.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use dropbox_core::{catalog::DepositId, store::DropboxStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::Authenticated, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct RevealBody {
  /// A number or a numeric string.
  #[serde(default, deserialize_with = "crate::json::lenient_id")]
  pub deposit_id: Option<DepositId>,
}

#[derive(Debug, Serialize)]
pub struct RevealedSong {
  pub title:       String,
  pub artist:      String,
  pub spotify_url: Option<String>,
  pub deezer_url:  Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RevealResponse {
  pub song:           RevealedSong,
  pub points_balance: i64,
}

/// `POST /reveal-song` with body `{"deposit_id": <id>}`.
///
/// Charges the configured reveal cost on the first reveal. A repeat reveal,
/// or a reveal of a deposit already discovered as main, charges nothing.
pub async fn reveal<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  body: Result<Json<RevealBody>, JsonRejection>,
) -> Result<Json<RevealResponse>, ApiError>
where
  S: DropboxStore + 'static,
{
  let Json(body) = body?;
  let deposit_id = body
    .deposit_id
    .ok_or_else(|| ApiError::BadRequest("deposit_id is required".into()))?;

  let reveal = state
    .store
    .reveal_deposit(user.user_id, deposit_id, state.settings.reveal_cost)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(
    user_id = user.user_id,
    deposit_id,
    charged = !reveal.already_discovered,
    balance = reveal.points_balance,
    "deposit revealed"
  );

  let song = reveal.song;
  Ok(Json(RevealResponse {
    song:           RevealedSong {
      title:       song.title,
      artist:      song.artist,
      spotify_url: song.spotify_url,
      deezer_url:  song.deezer_url,
    },
    points_balance: reveal.points_balance,
  }))
}
