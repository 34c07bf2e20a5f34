//! Boxes, songs and deposits.
//!
//! A deposit places one song into one box at one point in time. Deposits are
//! the things users later discover; boxes and songs are the metadata needed
//! to render them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::{User, UserId};

pub type BoxId = i64;
pub type SongId = i64;
pub type DepositId = i64;

// ─── Box ─────────────────────────────────────────────────────────────────────

/// A named physical or virtual location where songs are deposited.
///
/// Named `MusicBox` to stay clear of [`std::boxed::Box`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicBox {
  pub box_id:      BoxId,
  pub name:        String,
  pub description: String,
  /// URL slug; unique across boxes.
  pub url:         String,
  pub image_url:   Option<String>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::DropboxStore::add_box`].
#[derive(Debug, Clone, Default)]
pub struct NewBox {
  pub name:        String,
  pub description: String,
  pub url:         String,
  pub image_url:   Option<String>,
}

impl NewBox {
  pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
    Self { name: name.into(), url: url.into(), ..Self::default() }
  }
}

// ─── Song ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
  pub song_id:     SongId,
  pub title:       String,
  pub artist:      String,
  pub spotify_url: Option<String>,
  pub deezer_url:  Option<String>,
  pub image_url:   Option<String>,
  /// Track length in seconds; 0 when unknown.
  pub duration:    u32,
}

/// Input to [`crate::store::DropboxStore::upsert_song`].
#[derive(Debug, Clone, Default)]
pub struct NewSong {
  pub title:       String,
  pub artist:      String,
  pub spotify_url: Option<String>,
  pub deezer_url:  Option<String>,
  pub image_url:   Option<String>,
  pub duration:    u32,
}

impl NewSong {
  pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
    Self { title: title.into(), artist: artist.into(), ..Self::default() }
  }
}

// ─── Deposit ─────────────────────────────────────────────────────────────────

/// One song placed into one box by one user (or anonymously).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
  pub deposit_id:   DepositId,
  pub box_id:       BoxId,
  pub song_id:      SongId,
  /// `None` for anonymous deposits.
  pub user_id:      Option<UserId>,
  pub deposited_at: DateTime<Utc>,
}

/// Input to [`crate::store::DropboxStore::add_deposit`].
///
/// `deposited_at` defaults to the store's clock when `None`.
#[derive(Debug, Clone)]
pub struct NewDeposit {
  pub box_id:       BoxId,
  pub song_id:      SongId,
  pub user_id:      Option<UserId>,
  pub deposited_at: Option<DateTime<Utc>>,
}

impl NewDeposit {
  pub fn new(box_id: BoxId, song_id: SongId, user_id: Option<UserId>) -> Self {
    Self { box_id, song_id, user_id, deposited_at: None }
  }
}

/// A deposit joined with everything needed to render it.
#[derive(Debug, Clone)]
pub struct DepositDetail {
  pub deposit:   Deposit,
  pub music_box: MusicBox,
  pub song:      Song,
  /// The depositor; `None` for anonymous deposits.
  pub user:      Option<User>,
}
