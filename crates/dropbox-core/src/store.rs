//! The `DropboxStore` trait.
//!
//! Implemented by storage backends (e.g. `dropbox-store-sqlite`). The HTTP
//! layer depends on this abstraction only.

use std::future::Future;

use crate::{
  catalog::{
    BoxId, Deposit, DepositDetail, DepositId, MusicBox, NewBox, NewDeposit, NewSong, Song,
  },
  discovery::{DiscoveryEvent, DiscoveryRecord, NewDiscovery, Reveal},
  error::AsDomainError,
  user::{NewUser, User, UserId},
};

/// Abstraction over a dropbox store backend.
///
/// Discoveries are append-only: once recorded they are never updated or
/// deleted. Domain failures (unknown deposit, duplicate discovery, ...) are
/// reported through [`AsDomainError`] so callers can react to them without
/// knowing the backend.
///
/// All methods return `Send` futures so the trait can be used behind `axum`.
pub trait DropboxStore: Send + Sync {
  type Error: std::error::Error + AsDomainError + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Add `delta` (possibly negative) to a user's balance and return the new
  /// balance. Fails with `InsufficientFunds` rather than going below zero.
  fn add_points(
    &self,
    user_id: UserId,
    delta: i64,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Catalog ───────────────────────────────────────────────────────────

  fn add_box(
    &self,
    input: NewBox,
  ) -> impl Future<Output = Result<MusicBox, Self::Error>> + Send + '_;

  /// Look a box up by its URL slug.
  fn get_box_by_url<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<Option<MusicBox>, Self::Error>> + Send + 'a;

  fn count_box_deposits(
    &self,
    box_id: BoxId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Return the song matching `input`'s title and artist (case-insensitive),
  /// adding it when there is none. Streaming URLs given in `input` replace
  /// the stored ones; other metadata only fills gaps.
  fn upsert_song(
    &self,
    input: NewSong,
  ) -> impl Future<Output = Result<Song, Self::Error>> + Send + '_;

  fn add_deposit(
    &self,
    input: NewDeposit,
  ) -> impl Future<Output = Result<Deposit, Self::Error>> + Send + '_;

  /// A deposit joined with its box, song and depositor.
  fn get_deposit(
    &self,
    id: DepositId,
  ) -> impl Future<Output = Result<Option<DepositDetail>, Self::Error>> + Send + '_;

  /// A box's most recent deposits, newest first.
  fn list_box_deposits(
    &self,
    box_id: BoxId,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<DepositDetail>, Self::Error>> + Send + '_;

  /// The user's own deposits, newest first.
  fn list_user_deposits(
    &self,
    user_id: UserId,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<DepositDetail>, Self::Error>> + Send + '_;

  // ── Discoveries ───────────────────────────────────────────────────────

  /// Append a discovery. Fails with `DepositNotFound` for an unknown deposit
  /// and `AlreadyDiscovered` when the user has already discovered it.
  fn record_discovery(
    &self,
    input: NewDiscovery,
  ) -> impl Future<Output = Result<DiscoveryEvent, Self::Error>> + Send + '_;

  /// All of a user's discoveries with their deposit relations loaded, in no
  /// particular order. With `max_events`, only the most recent ones.
  fn list_discoveries(
    &self,
    user_id: UserId,
    max_events: Option<usize>,
  ) -> impl Future<Output = Result<Vec<DiscoveryRecord>, Self::Error>> + Send + '_;

  /// The user's discoveries among `deposit_ids`; deposits the user has not
  /// discovered are simply absent.
  fn find_discoveries<'a>(
    &'a self,
    user_id: UserId,
    deposit_ids: &'a [DepositId],
  ) -> impl Future<Output = Result<Vec<DiscoveryEvent>, Self::Error>> + Send + 'a;

  /// Charge `cost` points and record a `revealed` discovery, atomically.
  ///
  /// Nothing is charged when the user has already discovered the deposit.
  fn reveal_deposit(
    &self,
    user_id: UserId,
    deposit_id: DepositId,
    cost: i64,
  ) -> impl Future<Output = Result<Reveal, Self::Error>> + Send + '_;
}
