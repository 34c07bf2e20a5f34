//! Discovery events, the append-only log the session builder reads.
//!
//! A discovery records that a user uncovered the song behind a deposit. There
//! is at most one discovery per `(user, deposit)` pair, and once written it is
//! never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
  catalog::{DepositDetail, DepositId, MusicBox, Song},
  user::UserId,
};

pub type EventId = i64;

/// How a deposit came to be discovered.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DiscoveredType {
  /// The box's latest deposit, seen by arriving at the box.
  Main,
  /// An older deposit, unlocked by paying points.
  #[default]
  Revealed,
}

impl DiscoveredType {
  /// Lenient parse used at the API edge: missing or unrecognised values fall
  /// back to [`DiscoveredType::Revealed`].
  pub fn coerce(raw: Option<&str>) -> Self {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
  }

  pub fn is_main(self) -> bool { matches!(self, Self::Main) }
}

/// One user's discovery of one deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryEvent {
  /// Store-assigned, increasing with insertion order. Breaks ties between
  /// events sharing a timestamp.
  pub id:              EventId,
  pub user_id:         UserId,
  pub deposit_id:      DepositId,
  pub discovered_type: DiscoveredType,
  pub discovered_at:   DateTime<Utc>,
}

/// Input to [`crate::store::DropboxStore::record_discovery`].
///
/// `discovered_at` defaults to the store's clock when `None`.
#[derive(Debug, Clone)]
pub struct NewDiscovery {
  pub user_id:         UserId,
  pub deposit_id:      DepositId,
  pub discovered_type: DiscoveredType,
  pub discovered_at:   Option<DateTime<Utc>>,
}

impl NewDiscovery {
  pub fn new(
    user_id: UserId,
    deposit_id: DepositId,
    discovered_type: DiscoveredType,
  ) -> Self {
    Self { user_id, deposit_id, discovered_type, discovered_at: None }
  }
}

/// A discovery event with its deposit relations pre-fetched, so that
/// rendering a session never goes back to the store.
#[derive(Debug, Clone)]
pub struct DiscoveryRecord {
  pub event:  DiscoveryEvent,
  pub detail: DepositDetail,
}

impl DiscoveryRecord {
  pub fn music_box(&self) -> &MusicBox { &self.detail.music_box }
}

/// Result of [`crate::store::DropboxStore::reveal_deposit`].
#[derive(Debug, Clone)]
pub struct Reveal {
  pub song:               Song,
  /// Balance after the debit (unchanged when nothing was charged).
  pub points_balance:     i64,
  /// `true` when the user had already discovered the deposit; no points were
  /// charged and no event was appended.
  pub already_discovered: bool,
}
