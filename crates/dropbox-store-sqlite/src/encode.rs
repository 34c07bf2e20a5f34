//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Rows are first read into `Raw*` structs holding exactly what SQLite
//! returned; decoding into domain types happens outside the connection
//! thread.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use dropbox_core::{
  catalog::{Deposit, DepositDetail, MusicBox, Song},
  discovery::{DiscoveredType, DiscoveryEvent, DiscoveryRecord},
  user::User,
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The store's clock, truncated to the precision kept on disk.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── DiscoveredType ──────────────────────────────────────────────────────────

pub fn encode_discovered_type(t: DiscoveredType) -> &'static str { t.into() }

pub fn decode_discovered_type(s: &str) -> Result<DiscoveredType> {
  s.parse()
    .map_err(|_| dropbox_core::Error::UnknownDiscoveredType(s.to_owned()).into())
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "u.user_id, u.username, u.display_name, u.profile_pic_url, u.points, u.password_hash, \
   u.created_at";

pub const BOX_COLUMNS: &str =
  "b.box_id, b.name, b.description, b.url, b.image_url, b.created_at";

pub const SONG_COLUMNS: &str =
  "s.song_id, s.title, s.artist, s.spotify_url, s.deezer_url, s.image_url, s.duration";

pub const EVENT_COLUMNS: &str =
  "d.discovery_id, d.user_id, d.deposit_id, d.discovered_type, d.discovered_at";

/// Columns for [`RawDepositDetail::from_row`]; pair with [`DETAIL_JOINS`].
pub const DETAIL_COLUMNS: &str = "p.deposit_id, p.box_id, p.song_id, p.user_id, \
   p.deposited_at, b.box_id, b.name, b.description, b.url, b.image_url, b.created_at, \
   s.song_id, s.title, s.artist, s.spotify_url, s.deezer_url, s.image_url, s.duration, \
   u.user_id, u.username, u.display_name, u.profile_pic_url, u.points, u.password_hash, \
   u.created_at";

/// Joins a `deposits p` row to its box, song and (optional) depositor.
pub const DETAIL_JOINS: &str = "JOIN boxes b ON b.box_id = p.box_id
   JOIN songs s ON s.song_id = p.song_id
   LEFT JOIN users u ON u.user_id = p.user_id";

const BOX_WIDTH: usize = 6;
const SONG_WIDTH: usize = 7;
const DEPOSIT_WIDTH: usize = 5;
const EVENT_WIDTH: usize = 5;

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `users` row.
pub struct RawUser {
  pub user_id:         i64,
  pub username:        String,
  pub display_name:    String,
  pub profile_pic_url: Option<String>,
  pub points:          i64,
  pub password_hash:   Option<String>,
  pub created_at:      String,
}

impl RawUser {
  /// Read [`USER_COLUMNS`] starting at column `at`.
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:         row.get(at)?,
      username:        row.get(at + 1)?,
      display_name:    row.get(at + 2)?,
      profile_pic_url: row.get(at + 3)?,
      points:          row.get(at + 4)?,
      password_hash:   row.get(at + 5)?,
      created_at:      row.get(at + 6)?,
    })
  }

  /// Like [`Self::from_row`], for the nullable side of a `LEFT JOIN`.
  fn from_optional_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Option<Self>> {
    let id: Option<i64> = row.get(at)?;
    id.map(|_| Self::from_row(row, at)).transpose()
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:         self.user_id,
      username:        self.username,
      display_name:    self.display_name,
      profile_pic_url: self.profile_pic_url,
      points:          self.points,
      password_hash:   self.password_hash,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `boxes` row.
pub struct RawBox {
  pub box_id:      i64,
  pub name:        String,
  pub description: String,
  pub url:         String,
  pub image_url:   Option<String>,
  pub created_at:  String,
}

impl RawBox {
  /// Read [`BOX_COLUMNS`] starting at column `at`.
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      box_id:      row.get(at)?,
      name:        row.get(at + 1)?,
      description: row.get(at + 2)?,
      url:         row.get(at + 3)?,
      image_url:   row.get(at + 4)?,
      created_at:  row.get(at + 5)?,
    })
  }

  pub fn into_box(self) -> Result<MusicBox> {
    Ok(MusicBox {
      box_id:      self.box_id,
      name:        self.name,
      description: self.description,
      url:         self.url,
      image_url:   self.image_url,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `songs` row. Needs no fallible decoding.
pub struct RawSong {
  pub song_id:     i64,
  pub title:       String,
  pub artist:      String,
  pub spotify_url: Option<String>,
  pub deezer_url:  Option<String>,
  pub image_url:   Option<String>,
  pub duration:    i64,
}

impl RawSong {
  /// Read [`SONG_COLUMNS`] starting at column `at`.
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      song_id:     row.get(at)?,
      title:       row.get(at + 1)?,
      artist:      row.get(at + 2)?,
      spotify_url: row.get(at + 3)?,
      deezer_url:  row.get(at + 4)?,
      image_url:   row.get(at + 5)?,
      duration:    row.get(at + 6)?,
    })
  }

  pub fn into_song(self) -> Song {
    Song {
      song_id:     self.song_id,
      title:       self.title,
      artist:      self.artist,
      spotify_url: self.spotify_url,
      deezer_url:  self.deezer_url,
      image_url:   self.image_url,
      duration:    u32::try_from(self.duration).unwrap_or_default(),
    }
  }
}

/// Raw values read from a `deposits` row.
pub struct RawDeposit {
  pub deposit_id:   i64,
  pub box_id:       i64,
  pub song_id:      i64,
  pub user_id:      Option<i64>,
  pub deposited_at: String,
}

impl RawDeposit {
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      deposit_id:   row.get(at)?,
      box_id:       row.get(at + 1)?,
      song_id:      row.get(at + 2)?,
      user_id:      row.get(at + 3)?,
      deposited_at: row.get(at + 4)?,
    })
  }

  pub fn into_deposit(self) -> Result<Deposit> {
    Ok(Deposit {
      deposit_id:   self.deposit_id,
      box_id:       self.box_id,
      song_id:      self.song_id,
      user_id:      self.user_id,
      deposited_at: decode_dt(&self.deposited_at)?,
    })
  }
}

/// A deposit row joined with its relations; see [`DETAIL_COLUMNS`].
pub struct RawDepositDetail {
  pub deposit:   RawDeposit,
  pub music_box: RawBox,
  pub song:      RawSong,
  pub user:      Option<RawUser>,
}

impl RawDepositDetail {
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    let box_at = at + DEPOSIT_WIDTH;
    let song_at = box_at + BOX_WIDTH;
    let user_at = song_at + SONG_WIDTH;
    Ok(Self {
      deposit:   RawDeposit::from_row(row, at)?,
      music_box: RawBox::from_row(row, box_at)?,
      song:      RawSong::from_row(row, song_at)?,
      user:      RawUser::from_optional_row(row, user_at)?,
    })
  }

  pub fn into_detail(self) -> Result<DepositDetail> {
    Ok(DepositDetail {
      deposit:   self.deposit.into_deposit()?,
      music_box: self.music_box.into_box()?,
      song:      self.song.into_song(),
      user:      self.user.map(RawUser::into_user).transpose()?,
    })
  }
}

/// Raw values read from a `discoveries` row; see [`EVENT_COLUMNS`].
pub struct RawDiscoveryEvent {
  pub discovery_id:    i64,
  pub user_id:         i64,
  pub deposit_id:      i64,
  pub discovered_type: String,
  pub discovered_at:   String,
}

impl RawDiscoveryEvent {
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      discovery_id:    row.get(at)?,
      user_id:         row.get(at + 1)?,
      deposit_id:      row.get(at + 2)?,
      discovered_type: row.get(at + 3)?,
      discovered_at:   row.get(at + 4)?,
    })
  }

  pub fn into_event(self) -> Result<DiscoveryEvent> {
    Ok(DiscoveryEvent {
      id:              self.discovery_id,
      user_id:         self.user_id,
      deposit_id:      self.deposit_id,
      discovered_type: decode_discovered_type(&self.discovered_type)?,
      discovered_at:   decode_dt(&self.discovered_at)?,
    })
  }
}

/// [`EVENT_COLUMNS`] followed by [`DETAIL_COLUMNS`].
pub struct RawDiscoveryRecord {
  pub event:  RawDiscoveryEvent,
  pub detail: RawDepositDetail,
}

impl RawDiscoveryRecord {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event:  RawDiscoveryEvent::from_row(row, 0)?,
      detail: RawDepositDetail::from_row(row, EVENT_WIDTH)?,
    })
  }

  pub fn into_record(self) -> Result<DiscoveryRecord> {
    Ok(DiscoveryRecord { event: self.event.into_event()?, detail: self.detail.into_detail()? })
  }
}
