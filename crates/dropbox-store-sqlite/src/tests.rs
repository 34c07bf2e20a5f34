//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Duration, TimeZone, Utc};
use dropbox_core::{
  AsDomainError as _, DiscoverySessionBuilder, PageRequest,
  catalog::{MusicBox, NewBox, NewDeposit, NewSong},
  discovery::{DiscoveredType, NewDiscovery},
  session::SessionId,
  store::DropboxStore,
  user::{NewUser, User},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 3, 14, 18, 0, 0).unwrap() }

async fn user(s: &SqliteStore, name: &str) -> User {
  s.add_user(NewUser::new(name)).await.unwrap()
}

async fn music_box(s: &SqliteStore, slug: &str) -> MusicBox {
  s.add_box(NewBox::new(format!("Box {slug}"), slug)).await.unwrap()
}

/// Deposit the shared test song into `box_id` and return the deposit id.
async fn deposit(s: &SqliteStore, box_id: i64, by: Option<i64>) -> i64 {
  let song = s.upsert_song(NewSong::new("Song", "Artist")).await.unwrap();
  let mut input = NewDeposit::new(box_id, song.song_id, by);
  input.deposited_at = Some(t0() - Duration::days(2));
  s.add_deposit(input).await.unwrap().deposit_id
}

async fn discover(
  s: &SqliteStore,
  user_id: i64,
  deposit_id: i64,
  kind: DiscoveredType,
  minutes: i64,
) {
  let mut input = NewDiscovery::new(user_id, deposit_id, kind);
  input.discovered_at = Some(t0() + Duration::minutes(minutes));
  s.record_discovery(input).await.unwrap();
}

fn domain(err: &Error) -> &dropbox_core::Error {
  err.as_domain().expect("domain error")
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_look_up_user() {
  let s = store().await;
  let mut input = NewUser::new("alice");
  input.display_name = "Alice Liddell".into();
  input.password_hash = Some("$argon2id$stub".into());
  let created = s.add_user(input).await.unwrap();
  assert_eq!(created.points, 0);

  let by_name = s.get_user_by_username("alice").await.unwrap().unwrap();
  assert_eq!(by_name.user_id, created.user_id);
  assert_eq!(by_name.shown_name(), "Alice Liddell");
  assert_eq!(by_name.password_hash.as_deref(), Some("$argon2id$stub"));
  assert_eq!(by_name.created_at, created.created_at);
  assert!(s.get_user_by_username("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  user(&s, "alice").await;
  let err = s.add_user(NewUser::new("alice")).await.unwrap_err();
  assert!(matches!(domain(&err), dropbox_core::Error::UsernameTaken(n) if n == "alice"));
}

#[tokio::test]
async fn points_cannot_go_negative() {
  let s = store().await;
  let u = user(&s, "alice").await;

  assert_eq!(s.add_points(u.user_id, 150).await.unwrap(), 150);
  assert_eq!(s.add_points(u.user_id, -50).await.unwrap(), 100);

  let err = s.add_points(u.user_id, -101).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    dropbox_core::Error::InsufficientFunds { balance: 100, required: 101 }
  ));
  assert_eq!(s.get_user_by_username("alice").await.unwrap().unwrap().points, 100);

  let err = s.add_points(999, 10).await.unwrap_err();
  assert!(matches!(domain(&err), dropbox_core::Error::UserNotFound(999)));
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn box_lookup_and_deposit_count() {
  let s = store().await;
  let b = music_box(&s, "gare-du-nord").await;
  deposit(&s, b.box_id, None).await;
  deposit(&s, b.box_id, None).await;

  let found = s.get_box_by_url("gare-du-nord").await.unwrap().unwrap();
  assert_eq!(found.box_id, b.box_id);
  assert_eq!(found.name, "Box gare-du-nord");
  assert_eq!(s.count_box_deposits(b.box_id).await.unwrap(), 2);
  assert!(s.get_box_by_url("nowhere").await.unwrap().is_none());
}

#[tokio::test]
async fn deposit_detail_includes_relations() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let b = music_box(&s, "a").await;
  let mine = deposit(&s, b.box_id, Some(alice.user_id)).await;
  let anon = deposit(&s, b.box_id, None).await;

  let detail = s.get_deposit(mine).await.unwrap().unwrap();
  assert_eq!(detail.music_box.url, "a");
  assert_eq!(detail.song.title, "Song");
  assert_eq!(detail.user.unwrap().username, "alice");

  let detail = s.get_deposit(anon).await.unwrap().unwrap();
  assert!(detail.user.is_none());

  assert!(s.get_deposit(12345).await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_song_reuses_case_insensitive_match() {
  let s = store().await;
  let mut first = NewSong::new("Hey Jude", "The Beatles");
  first.image_url = Some("https://img/1.jpg".into());
  first.duration = 431;
  let original = s.upsert_song(first).await.unwrap();

  let mut again = NewSong::new("hey jude", "THE BEATLES");
  again.deezer_url = Some("https://deezer.com/track/1".into());
  again.image_url = Some("https://img/2.jpg".into());
  let merged = s.upsert_song(again).await.unwrap();

  assert_eq!(merged.song_id, original.song_id);
  assert_eq!(merged.title, "Hey Jude");
  assert_eq!(merged.deezer_url.as_deref(), Some("https://deezer.com/track/1"));
  assert_eq!(merged.image_url.as_deref(), Some("https://img/1.jpg"));
  assert_eq!(merged.duration, 431);

  let other = s.upsert_song(NewSong::new("Let It Be", "The Beatles")).await.unwrap();
  assert_ne!(other.song_id, original.song_id);
}

#[tokio::test]
async fn box_deposits_are_newest_first_and_limited() {
  let s = store().await;
  let a = music_box(&s, "a").await;
  let b = music_box(&s, "b").await;
  let song = s.upsert_song(NewSong::new("t", "a")).await.unwrap();

  let mut ids = Vec::new();
  for days in [3, 1, 1, 2] {
    let mut input = NewDeposit::new(a.box_id, song.song_id, None);
    input.deposited_at = Some(t0() - Duration::days(days));
    ids.push(s.add_deposit(input).await.unwrap().deposit_id);
  }
  deposit(&s, b.box_id, None).await;

  let listed: Vec<_> = s
    .list_box_deposits(a.box_id, 10)
    .await
    .unwrap()
    .into_iter()
    .map(|d| d.deposit.deposit_id)
    .collect();
  // Equal timestamps fall back to the higher id first.
  assert_eq!(listed, vec![ids[2], ids[1], ids[3], ids[0]]);

  let capped = s.list_box_deposits(a.box_id, 2).await.unwrap();
  assert_eq!(capped.len(), 2);
  assert!(s.list_box_deposits(999, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn deposit_into_missing_box_fails() {
  let s = store().await;
  let song = s.upsert_song(NewSong::new("t", "a")).await.unwrap();
  let err = s
    .add_deposit(NewDeposit::new(77, song.song_id, None))
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), dropbox_core::Error::BoxNotFound(77)));
}

#[tokio::test]
async fn user_deposits_are_newest_first_and_limited() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let b = music_box(&s, "a").await;
  let song = s.upsert_song(NewSong::new("t", "a")).await.unwrap();

  for days in [3, 1, 2] {
    let mut input = NewDeposit::new(b.box_id, song.song_id, Some(alice.user_id));
    input.deposited_at = Some(t0() - Duration::days(days));
    s.add_deposit(input).await.unwrap();
  }
  deposit(&s, b.box_id, None).await;

  let all = s.list_user_deposits(alice.user_id, 10).await.unwrap();
  assert_eq!(all.len(), 3);
  assert!(all.windows(2).all(|w| w[0].deposit.deposited_at > w[1].deposit.deposited_at));

  let capped = s.list_user_deposits(alice.user_id, 2).await.unwrap();
  assert_eq!(capped.len(), 2);
  assert_eq!(capped[0].deposit.deposit_id, all[0].deposit.deposit_id);
}

// ─── Discoveries ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_discovery_rejects_unknown_deposit_and_duplicates() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let b = music_box(&s, "a").await;
  let d = deposit(&s, b.box_id, None).await;

  let err = s
    .record_discovery(NewDiscovery::new(alice.user_id, 999, DiscoveredType::Main))
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), dropbox_core::Error::DepositNotFound(999)));

  let event = s
    .record_discovery(NewDiscovery::new(alice.user_id, d, DiscoveredType::Main))
    .await
    .unwrap();
  assert_eq!(event.deposit_id, d);

  let err = s
    .record_discovery(NewDiscovery::new(alice.user_id, d, DiscoveredType::Revealed))
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    dropbox_core::Error::AlreadyDiscovered { deposit_id, .. } if *deposit_id == d
  ));
  assert_eq!(s.list_discoveries(alice.user_id, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_discoveries_is_per_user_and_capped_to_most_recent() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let b = music_box(&s, "a").await;

  for minutes in [0, 10, 20] {
    let d = deposit(&s, b.box_id, None).await;
    discover(&s, alice.user_id, d, DiscoveredType::Revealed, minutes).await;
  }
  let d = deposit(&s, b.box_id, None).await;
  discover(&s, bob.user_id, d, DiscoveredType::Main, 5).await;

  let all = s.list_discoveries(alice.user_id, None).await.unwrap();
  assert_eq!(all.len(), 3);
  assert!(all.iter().all(|r| r.event.user_id == alice.user_id));

  let recent = s.list_discoveries(alice.user_id, Some(2)).await.unwrap();
  let times: Vec<_> = recent.iter().map(|r| r.event.discovered_at).collect();
  assert_eq!(times, vec![t0() + Duration::minutes(20), t0() + Duration::minutes(10)]);
}

#[tokio::test]
async fn find_discoveries_is_limited_to_user_and_ids() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let b = music_box(&s, "a").await;
  let d1 = deposit(&s, b.box_id, None).await;
  let d2 = deposit(&s, b.box_id, None).await;
  let d3 = deposit(&s, b.box_id, None).await;

  discover(&s, alice.user_id, d1, DiscoveredType::Main, 0).await;
  discover(&s, alice.user_id, d3, DiscoveredType::Revealed, 5).await;
  discover(&s, bob.user_id, d2, DiscoveredType::Revealed, 5).await;

  let found = s.find_discoveries(alice.user_id, &[d1, d2]).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].deposit_id, d1);
  assert_eq!(found[0].discovered_at, t0());

  assert!(s.find_discoveries(alice.user_id, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn reveal_charges_once_and_records_revealed() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let b = music_box(&s, "a").await;
  let d = deposit(&s, b.box_id, None).await;
  s.add_points(alice.user_id, 250).await.unwrap();

  let first = s.reveal_deposit(alice.user_id, d, 100).await.unwrap();
  assert!(!first.already_discovered);
  assert_eq!(first.points_balance, 150);
  assert_eq!(first.song.title, "Song");

  let again = s.reveal_deposit(alice.user_id, d, 100).await.unwrap();
  assert!(again.already_discovered);
  assert_eq!(again.points_balance, 150);

  let log = s.list_discoveries(alice.user_id, None).await.unwrap();
  assert_eq!(log.len(), 1);
  assert_eq!(log[0].event.discovered_type, DiscoveredType::Revealed);
}

#[tokio::test]
async fn reveal_without_enough_points_changes_nothing() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let b = music_box(&s, "a").await;
  let d = deposit(&s, b.box_id, None).await;
  s.add_points(alice.user_id, 40).await.unwrap();

  let err = s.reveal_deposit(alice.user_id, d, 100).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    dropbox_core::Error::InsufficientFunds { balance: 40, required: 100 }
  ));
  assert_eq!(s.get_user_by_username("alice").await.unwrap().unwrap().points, 40);
  assert!(s.list_discoveries(alice.user_id, None).await.unwrap().is_empty());

  let err = s.reveal_deposit(alice.user_id, 404, 100).await.unwrap_err();
  assert!(matches!(domain(&err), dropbox_core::Error::DepositNotFound(404)));
}

// ─── Sessions over stored discoveries ────────────────────────────────────────

#[tokio::test]
async fn interleaved_boxes_group_into_main_and_orphan_sessions() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let a = music_box(&s, "a").await;
  let b = music_box(&s, "b").await;

  let a1 = deposit(&s, a.box_id, None).await;
  let b1 = deposit(&s, b.box_id, None).await;
  let a2 = deposit(&s, a.box_id, None).await;
  let b2 = deposit(&s, b.box_id, None).await;

  // main at A, revealed at B, revealed at A, main at B.
  discover(&s, alice.user_id, a1, DiscoveredType::Main, 0).await;
  discover(&s, alice.user_id, b1, DiscoveredType::Revealed, 10).await;
  discover(&s, alice.user_id, a2, DiscoveredType::Revealed, 20).await;
  discover(&s, alice.user_id, b2, DiscoveredType::Main, 30).await;

  let records = s.list_discoveries(alice.user_id, None).await.unwrap();
  let page = DiscoverySessionBuilder::new(records).page(PageRequest::default(), t0());

  assert_eq!(page.sessions.len(), 3);
  assert!(!page.has_more);

  let by_id = |id: SessionId| {
    page
      .sessions
      .iter()
      .find(|s| s.session_id == id)
      .map(|s| s.deposits.iter().map(|d| d.deposit_id).collect::<Vec<_>>())
  };

  let main_a = records_event_id(&s, alice.user_id, a1).await;
  let main_b = records_event_id(&s, alice.user_id, b2).await;
  assert_eq!(by_id(SessionId::Main(main_a)), Some(vec![a1, a2]));
  assert_eq!(by_id(SessionId::Main(main_b)), Some(vec![b2]));
  assert_eq!(by_id(SessionId::Orphan(0)), Some(vec![b1]));

  // Newest first.
  assert_eq!(page.sessions[0].session_id, SessionId::Main(main_b));
  assert_eq!(page.sessions[0].music_box.url, "b");
}

async fn records_event_id(s: &SqliteStore, user_id: i64, deposit_id: i64) -> i64 {
  s.list_discoveries(user_id, None)
    .await
    .unwrap()
    .into_iter()
    .find(|r| r.event.deposit_id == deposit_id)
    .map(|r| r.event.id)
    .unwrap()
}
