//! Handlers for the caller's own account: deposits and points balance.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use dropbox_core::{catalog::DepositId, store::DropboxStore};
use serde::Serialize;

use crate::{AppState, auth::Authenticated, error::ApiError};

#[derive(Debug, Serialize)]
pub struct DepositSong {
  pub title:   String,
  pub artist:  String,
  pub img_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserDeposit {
  pub id:           DepositId,
  pub song:         DepositSong,
  pub deposited_at: DateTime<Utc>,
}

/// `GET /user-deposits`, newest first, capped by the configured limit.
pub async fn deposits<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
) -> Result<Json<Vec<UserDeposit>>, ApiError>
where
  S: DropboxStore + 'static,
{
  let details = state
    .store
    .list_user_deposits(user.user_id, state.settings.user_deposits_limit)
    .await
    .map_err(ApiError::from_store)?;

  let out = details
    .into_iter()
    .map(|d| UserDeposit {
      id:           d.deposit.deposit_id,
      song:         DepositSong {
        title:   d.song.title,
        artist:  d.song.artist,
        img_url: d.song.image_url,
      },
      deposited_at: d.deposit.deposited_at,
    })
    .collect();
  Ok(Json(out))
}

#[derive(Debug, Serialize)]
pub struct PointsResponse {
  pub points: i64,
}

/// `GET /points`
pub async fn points<S>(Authenticated(user): Authenticated) -> Json<PointsResponse>
where
  S: DropboxStore + 'static,
{
  Json(PointsResponse { points: user.points })
}
