//! Projection of discovery records and box deposits into the wire shapes
//! returned to clients.
//!
//! Everything here is a pure function of already-loaded data plus a reference
//! `now` for the humanised deposit date.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  catalog::{BoxId, DepositDetail, DepositId, MusicBox, Song, SongId},
  discovery::{DiscoveredType, DiscoveryEvent, DiscoveryRecord},
  humanize::{natural_time, natural_time_short},
  user::{User, UserId},
};

/// Song metadata as shown for a discovered deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongView {
  pub id:          SongId,
  pub title:       String,
  pub artist:      String,
  pub spotify_url: Option<String>,
  pub deezer_url:  Option<String>,
  pub img_url:     Option<String>,
}

impl From<&Song> for SongView {
  fn from(s: &Song) -> Self {
    Self {
      id:          s.song_id,
      title:       s.title.clone(),
      artist:      s.artist.clone(),
      spotify_url: s.spotify_url.clone(),
      deezer_url:  s.deezer_url.clone(),
      img_url:     s.image_url.clone(),
    }
  }
}

/// The depositor as shown next to a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
  pub id:              UserId,
  pub name:            String,
  pub profile_pic_url: Option<String>,
}

impl From<&User> for UserView {
  fn from(u: &User) -> Self {
    Self {
      id:              u.user_id,
      name:            u.shown_name().to_owned(),
      profile_pic_url: u.profile_pic_url.clone(),
    }
  }
}

/// The `{id, name, url}` triple identifying a session's box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxRef {
  pub id:   BoxId,
  pub name: String,
  pub url:  String,
}

impl From<&MusicBox> for BoxRef {
  fn from(b: &MusicBox) -> Self {
    Self { id: b.box_id, name: b.name.clone(), url: b.url.clone() }
  }
}

/// One rendered discovery inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryEntry {
  #[serde(rename = "type")]
  pub kind:          DiscoveredType,
  pub discovered_at: DateTime<Utc>,
  pub deposit_id:    DepositId,
  /// Humanised age of the deposit, e.g. `3 hours ago`.
  pub deposit_date:  String,
  pub song:          SongView,
  /// `None` for anonymous deposits.
  pub user:          Option<UserView>,
}

pub fn render_entry(record: &DiscoveryRecord, now: DateTime<Utc>) -> DiscoveryEntry {
  let detail = &record.detail;
  DiscoveryEntry {
    kind:          record.event.discovered_type,
    discovered_at: record.event.discovered_at,
    deposit_id:    detail.deposit.deposit_id,
    deposit_date:  natural_time(detail.deposit.deposited_at, now),
    song:          SongView::from(&detail.song),
    user:          detail.user.as_ref().map(UserView::from),
  }
}

// ─── Box contents ────────────────────────────────────────────────────────────

/// A song inside a box listing: in full, or as a priced teaser while the
/// viewer has not discovered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BoxSong {
  Full(SongView),
  Teaser { id: SongId, img_url: Option<String>, cost: i64 },
}

/// Whether the viewer has discovered an older deposit, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryStatus {
  pub already_discovered: bool,
  /// Humanised, `None` until discovered.
  pub discovered_at:      Option<String>,
}

/// One deposit as listed in a box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxDeposit {
  pub deposit_id:   DepositId,
  pub deposit_date: String,
  /// Absent for the box's latest deposit, which is always shown in full.
  #[serde(flatten)]
  pub discovery:    Option<DiscoveryStatus>,
  pub song:         BoxSong,
  pub user:         Option<UserView>,
}

/// A single deposit shown in full, as for the box's latest deposit.
pub fn render_deposit(detail: &DepositDetail, now: DateTime<Utc>) -> BoxDeposit {
  BoxDeposit {
    deposit_id:   detail.deposit.deposit_id,
    deposit_date: natural_time_short(detail.deposit.deposited_at, now),
    discovery:    None,
    song:         BoxSong::Full(SongView::from(&detail.song)),
    user:         detail.user.as_ref().map(UserView::from),
  }
}

/// Render a box's deposits, newest first as given.
///
/// The first deposit is shown in full. Later ones are shown in full only
/// when found in `discovered` (the viewer's discoveries; empty for anonymous
/// viewers) and otherwise as a teaser priced at `reveal_cost`.
pub fn render_box_deposits(
  details: &[DepositDetail],
  discovered: &[DiscoveryEvent],
  reveal_cost: i64,
  now: DateTime<Utc>,
) -> Vec<BoxDeposit> {
  let by_deposit: HashMap<DepositId, &DiscoveryEvent> =
    discovered.iter().map(|e| (e.deposit_id, e)).collect();

  let mut out = Vec::with_capacity(details.len());
  let mut iter = details.iter();
  if let Some(head) = iter.next() {
    out.push(render_deposit(head, now));
  }

  for detail in iter {
    let mut entry = render_deposit(detail, now);
    match by_deposit.get(&detail.deposit.deposit_id) {
      Some(event) => {
        entry.discovery = Some(DiscoveryStatus {
          already_discovered: true,
          discovered_at:      Some(natural_time_short(event.discovered_at, now)),
        });
      }
      None => {
        entry.discovery = Some(DiscoveryStatus { already_discovered: false, discovered_at: None });
        entry.song = BoxSong::Teaser {
          id:      detail.song.song_id,
          img_url: detail.song.image_url.clone(),
          cost:    reveal_cost,
        };
      }
    }
    out.push(entry);
  }
  out
}
