//! Reconstruction of discovery sessions from a user's discovery log.
//!
//! A session is a burst of discoveries made during one box visit. Sessions
//! are never stored; they are rebuilt from the append-only discovery log on
//! every query, in two passes over the log sorted by `(discovered_at, id)`:
//!
//! 1. **Main pass.** Every `main` discovery heads a session. It absorbs the
//!    `revealed` discoveries of the same box made within
//!    [`SESSION_WINDOW_SECS`] of it, but never reaches past the next `main`
//!    discovery of any box.
//! 2. **Orphan pass.** Every `revealed` discovery left over founds an orphan
//!    session, which absorbs later leftovers of the same box inside the
//!    founder's window, again stopping at the next `main` discovery.
//!
//! Each discovery ends up in exactly one session. Sessions are then ordered
//! newest first and paginated.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

use crate::{
  catalog::BoxId,
  discovery::{DiscoveryRecord, EventId},
  render::{BoxRef, DiscoveryEntry, render_entry},
};

/// Maximum distance between a session's first discovery and any `revealed`
/// discovery it absorbs.
pub const SESSION_WINDOW_SECS: i64 = 3600;

pub const DEFAULT_PAGE_LIMIT: usize = 10;

fn session_window() -> TimeDelta { TimeDelta::seconds(SESSION_WINDOW_SECS) }

// ─── Pagination ──────────────────────────────────────────────────────────────

/// Session-level pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub limit:  usize,
  pub offset: usize,
}

impl Default for PageRequest {
  fn default() -> Self { Self { limit: DEFAULT_PAGE_LIMIT, offset: 0 } }
}

impl PageRequest {
  /// Build a request from raw client values. A missing or non-positive
  /// `limit` becomes [`DEFAULT_PAGE_LIMIT`]; a missing or negative `offset`
  /// becomes 0.
  pub fn coerce(limit: Option<i64>, offset: Option<i64>) -> Self {
    let limit = limit
      .filter(|l| *l > 0)
      .and_then(|l| usize::try_from(l).ok())
      .unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = offset
      .filter(|o| *o >= 0)
      .and_then(|o| usize::try_from(o).ok())
      .unwrap_or(0);
    Self { limit, offset }
  }
}

// ─── Output types ────────────────────────────────────────────────────────────

/// Identifies a session: the id of its driving `main` discovery, or a
/// synthetic `orph-<n>` for sessions without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionId {
  Main(EventId),
  /// `n` counts orphan sessions in chronological order of their founders.
  Orphan(usize),
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Main(id) => write!(f, "{id}"),
      Self::Orphan(n) => write!(f, "orph-{n}"),
    }
  }
}

impl Serialize for SessionId {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

/// A rendered session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
  pub session_id: SessionId,
  #[serde(rename = "box")]
  pub music_box:  BoxRef,
  pub started_at: DateTime<Utc>,
  /// Driving discovery first, then absorbed discoveries in chronological
  /// order.
  pub deposits:   Vec<DiscoveryEntry>,
}

/// One page of sessions, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionPage {
  pub sessions:    Vec<Session>,
  pub limit:       usize,
  pub offset:      usize,
  pub has_more:    bool,
  /// Always `offset + sessions.len()`, even on the last page.
  pub next_offset: usize,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// A session before rendering: positions into the sorted record list.
#[derive(Debug, Clone)]
struct SessionGroup {
  session_id: SessionId,
  started_at: DateTime<Utc>,
  members:    Vec<usize>,
}

/// Groups one user's discovery records into sessions.
///
/// Construction does all of the grouping work; [`Self::page`] and
/// [`Self::sessions`] only slice and render.
#[derive(Debug, Clone)]
pub struct DiscoverySessionBuilder {
  /// Sorted ascending by `(discovered_at, id)`.
  records: Vec<DiscoveryRecord>,
  /// Sorted by `started_at` descending.
  groups:  Vec<SessionGroup>,
}

impl DiscoverySessionBuilder {
  /// Sort `records` chronologically and group them into sessions. The input
  /// order does not matter.
  pub fn new(mut records: Vec<DiscoveryRecord>) -> Self {
    records.sort_by_key(|r| (r.event.discovered_at, r.event.id));

    let next_main = next_main_index(&records);
    let mut consumed = vec![false; records.len()];

    let mut groups = build_main_sessions(&records, &next_main, &mut consumed);
    groups.extend(build_orphan_sessions(&records, &next_main, &mut consumed));
    debug_assert!(consumed.iter().all(|c| *c), "every discovery is grouped");

    // Stable: equal start times keep main sessions ahead of orphans.
    groups.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    Self { records, groups }
  }

  /// Total number of sessions.
  pub fn len(&self) -> usize { self.groups.len() }

  pub fn is_empty(&self) -> bool { self.groups.is_empty() }

  /// Render every session, newest first.
  pub fn sessions(&self, now: DateTime<Utc>) -> Vec<Session> {
    self.groups.iter().map(|g| self.render(g, now)).collect()
  }

  /// Render the sessions in `[offset, offset + limit)`.
  pub fn page(&self, page: PageRequest, now: DateTime<Utc>) -> SessionPage {
    let total = self.groups.len();
    let window_end = page.offset.saturating_add(page.limit);
    let start = page.offset.min(total);
    let end = window_end.min(total);

    let sessions: Vec<Session> = self.groups[start..end]
      .iter()
      .map(|g| self.render(g, now))
      .collect();

    SessionPage {
      limit: page.limit,
      offset: page.offset,
      has_more: window_end < total,
      next_offset: page.offset + sessions.len(),
      sessions,
    }
  }

  fn render(&self, group: &SessionGroup, now: DateTime<Utc>) -> Session {
    let head = &self.records[group.members[0]];
    Session {
      session_id: group.session_id,
      music_box:  BoxRef::from(head.music_box()),
      started_at: group.started_at,
      deposits:   group
        .members
        .iter()
        .map(|&i| render_entry(&self.records[i], now))
        .collect(),
    }
  }
}

// ─── Passes ──────────────────────────────────────────────────────────────────

/// `out[i]` is the index of the first `main` record at or after `i`, or
/// `records.len()` when there is none. `out` has `len + 1` entries so that
/// `out[i + 1]` is valid for every record.
fn next_main_index(records: &[DiscoveryRecord]) -> Vec<usize> {
  let n = records.len();
  let mut out = vec![n; n + 1];
  for i in (0..n).rev() {
    out[i] = if records[i].event.discovered_type.is_main() {
      i
    } else {
      out[i + 1]
    };
  }
  out
}

fn box_of(record: &DiscoveryRecord) -> BoxId { record.detail.music_box.box_id }

/// Absorb the unconsumed records in `start + 1 .. end` that belong to `box_id`
/// and fall within the window opened at `records[start]`.
fn absorb(
  records: &[DiscoveryRecord],
  start: usize,
  end: usize,
  consumed: &mut [bool],
) -> Vec<usize> {
  let head = &records[start];
  let box_id = box_of(head);
  let deadline = head.event.discovered_at + session_window();

  let mut members = vec![start];
  consumed[start] = true;

  for (j, candidate) in records.iter().enumerate().take(end).skip(start + 1) {
    // Sorted input: nothing after this can be inside the window either.
    if candidate.event.discovered_at > deadline {
      break;
    }
    if consumed[j] || box_of(candidate) != box_id {
      continue;
    }
    consumed[j] = true;
    members.push(j);
  }
  members
}

/// One session per `main` record, bounded by the next `main` of any box.
fn build_main_sessions(
  records: &[DiscoveryRecord],
  next_main: &[usize],
  consumed: &mut [bool],
) -> Vec<SessionGroup> {
  let mut sessions = Vec::new();
  for (i, head) in records.iter().enumerate() {
    if !head.event.discovered_type.is_main() {
      continue;
    }
    let members = absorb(records, i, next_main[i + 1], consumed);
    sessions.push(SessionGroup {
      session_id: SessionId::Main(head.event.id),
      started_at: head.event.discovered_at,
      members,
    });
  }
  sessions
}

/// One session per leftover `revealed` record that no earlier orphan absorbed.
fn build_orphan_sessions(
  records: &[DiscoveryRecord],
  next_main: &[usize],
  consumed: &mut [bool],
) -> Vec<SessionGroup> {
  let mut sessions = Vec::new();
  for (i, founder) in records.iter().enumerate() {
    if consumed[i] || founder.event.discovered_type.is_main() {
      continue;
    }
    let members = absorb(records, i, next_main[i], consumed);
    sessions.push(SessionGroup {
      session_id: SessionId::Orphan(sessions.len()),
      started_at: founder.event.discovered_at,
      members,
    });
  }
  sessions
}

#[cfg(test)]
mod tests {
  use std::collections::{HashMap, HashSet};

  use chrono::{Duration, TimeZone};

  use super::*;
  use crate::{
    catalog::{Deposit, DepositDetail, MusicBox, Song},
    discovery::{DiscoveredType, DiscoveryEvent},
  };

  const BOX_A: BoxId = 1;
  const BOX_B: BoxId = 2;

  fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 3, 14, 18, 0, 0).unwrap() }

  fn music_box(box_id: BoxId) -> MusicBox {
    MusicBox {
      box_id,
      name: format!("Box {box_id}"),
      description: String::new(),
      url: format!("box-{box_id}"),
      image_url: None,
      created_at: t0() - Duration::days(30),
    }
  }

  /// A discovery of deposit `id` (deposit ids mirror event ids) at
  /// `t0 + minutes`.
  fn rec(id: EventId, kind: DiscoveredType, minutes: i64, box_id: BoxId) -> DiscoveryRecord {
    rec_at(id, kind, t0() + Duration::minutes(minutes), box_id)
  }

  fn rec_at(
    id: EventId,
    kind: DiscoveredType,
    at: DateTime<Utc>,
    box_id: BoxId,
  ) -> DiscoveryRecord {
    DiscoveryRecord {
      event:  DiscoveryEvent {
        id,
        user_id: 7,
        deposit_id: id,
        discovered_type: kind,
        discovered_at: at,
      },
      detail: DepositDetail {
        deposit:   Deposit {
          deposit_id:   id,
          box_id,
          song_id:      id,
          user_id:      None,
          deposited_at: at - Duration::days(1),
        },
        music_box: music_box(box_id),
        song:      Song {
          song_id:     id,
          title:       format!("Song {id}"),
          artist:      "Artist".into(),
          spotify_url: None,
          deezer_url:  None,
          image_url:   None,
          duration:    180,
        },
        user:      None,
      },
    }
  }

  use DiscoveredType::{Main, Revealed};

  fn all_sessions(records: Vec<DiscoveryRecord>) -> Vec<Session> {
    DiscoverySessionBuilder::new(records).sessions(t0() + Duration::days(1))
  }

  fn ids(session: &Session) -> Vec<i64> {
    session.deposits.iter().map(|d| d.deposit_id).collect()
  }

  // ── Scenarios ─────────────────────────────────────────────────────────────

  #[test]
  fn main_absorbs_same_box_within_window_only() {
    let sessions = all_sessions(vec![
      rec(1, Main, 0, BOX_A),
      rec(2, Revealed, 10, BOX_A),
      rec(3, Revealed, 70, BOX_A),
    ]);

    assert_eq!(sessions.len(), 2);
    // Newest first: the orphan started at +70m.
    assert_eq!(sessions[0].session_id, SessionId::Orphan(0));
    assert_eq!(ids(&sessions[0]), vec![3]);
    assert_eq!(sessions[1].session_id, SessionId::Main(1));
    assert_eq!(ids(&sessions[1]), vec![1, 2]);
    assert_eq!(sessions[1].deposits[0].kind, Main);
    assert_eq!(sessions[1].deposits[1].kind, Revealed);
  }

  #[test]
  fn orphans_do_not_join_across_boxes() {
    let sessions = all_sessions(vec![
      rec(1, Revealed, 0, BOX_A),
      rec(2, Revealed, 30, BOX_B),
    ]);

    assert_eq!(sessions.len(), 2);
    assert_eq!(ids(&sessions[0]), vec![2]);
    assert_eq!(sessions[0].music_box.id, BOX_B);
    assert_eq!(sessions[0].session_id, SessionId::Orphan(1));
    assert_eq!(ids(&sessions[1]), vec![1]);
    assert_eq!(sessions[1].session_id, SessionId::Orphan(0));
  }

  #[test]
  fn revealed_before_next_main_joins_earlier_main() {
    let sessions = all_sessions(vec![
      rec(1, Main, 0, BOX_A),
      rec(2, Main, 5, BOX_B),
      rec(3, Revealed, 3, BOX_A),
    ]);

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].session_id, SessionId::Main(2));
    assert_eq!(ids(&sessions[0]), vec![2]);
    assert_eq!(sessions[1].session_id, SessionId::Main(1));
    assert_eq!(ids(&sessions[1]), vec![1, 3]);
  }

  #[test]
  fn revealed_after_next_main_does_not_join_earlier_main() {
    let sessions = all_sessions(vec![
      rec(1, Main, 0, BOX_A),
      rec(2, Main, 5, BOX_B),
      rec(3, Revealed, 8, BOX_A),
    ]);

    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0].session_id, SessionId::Orphan(0));
    assert_eq!(ids(&sessions[0]), vec![3]);
  }

  #[test]
  fn exactly_ten_sessions_fill_one_page() {
    let records = (0..10)
      .map(|i| rec(i + 1, Main, i * 120, BOX_A))
      .collect();
    let builder = DiscoverySessionBuilder::new(records);
    let page = builder.page(PageRequest::coerce(Some(10), Some(0)), t0());

    assert_eq!(page.sessions.len(), 10);
    assert!(!page.has_more);
    assert_eq!(page.next_offset, 10);
  }

  // ── Edge cases ────────────────────────────────────────────────────────────

  #[test]
  fn empty_log_yields_empty_page() {
    let builder = DiscoverySessionBuilder::new(Vec::new());
    assert!(builder.is_empty());

    let page = builder.page(PageRequest::default(), t0());
    assert!(page.sessions.is_empty());
    assert!(!page.has_more);
    assert_eq!(page.next_offset, 0);
  }

  #[test]
  fn lone_main_is_a_single_entry_session() {
    let sessions = all_sessions(vec![rec(1, Main, 0, BOX_A)]);
    assert_eq!(sessions.len(), 1);
    assert_eq!(ids(&sessions[0]), vec![1]);
    assert_eq!(sessions[0].started_at, t0());
  }

  #[test]
  fn revealed_at_exact_deadline_is_absorbed() {
    let sessions = all_sessions(vec![
      rec(1, Main, 0, BOX_A),
      rec_at(2, Revealed, t0() + Duration::seconds(SESSION_WINDOW_SECS), BOX_A),
      rec_at(3, Revealed, t0() + Duration::seconds(SESSION_WINDOW_SECS + 1), BOX_A),
    ]);
    assert_eq!(sessions.len(), 2);
    assert_eq!(ids(&sessions[1]), vec![1, 2]);
    assert_eq!(ids(&sessions[0]), vec![3]);
  }

  #[test]
  fn revealed_before_main_becomes_orphan() {
    let sessions = all_sessions(vec![
      rec(1, Revealed, 0, BOX_A),
      rec(2, Main, 10, BOX_A),
    ]);
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].session_id, SessionId::Main(2));
    assert_eq!(ids(&sessions[0]), vec![2]);
    assert_eq!(ids(&sessions[1]), vec![1]);
  }

  #[test]
  fn orphan_skips_other_boxes_and_keeps_scanning() {
    let sessions = all_sessions(vec![
      rec(1, Revealed, 0, BOX_A),
      rec(2, Revealed, 5, BOX_B),
      rec(3, Revealed, 10, BOX_A),
      rec(4, Revealed, 15, BOX_B),
    ]);
    assert_eq!(sessions.len(), 2);
    assert_eq!(ids(&sessions[0]), vec![2, 4]);
    assert_eq!(ids(&sessions[1]), vec![1, 3]);
  }

  #[test]
  fn orphan_stops_at_any_main() {
    let sessions = all_sessions(vec![
      rec(1, Revealed, 0, BOX_A),
      rec(2, Main, 10, BOX_B),
      rec(3, Revealed, 20, BOX_A),
    ]);
    assert_eq!(sessions.len(), 3);
    let orphan_ids: Vec<Vec<i64>> = sessions
      .iter()
      .filter(|s| matches!(s.session_id, SessionId::Orphan(_)))
      .map(ids)
      .collect();
    assert_eq!(orphan_ids, vec![vec![3], vec![1]]);
  }

  #[test]
  fn orphan_window_is_measured_from_founder() {
    // 4 is within an hour of 3 but not of the founder 1.
    let sessions = all_sessions(vec![
      rec(1, Revealed, 0, BOX_A),
      rec(3, Revealed, 50, BOX_A),
      rec(4, Revealed, 90, BOX_A),
    ]);
    assert_eq!(sessions.len(), 2);
    assert_eq!(ids(&sessions[1]), vec![1, 3]);
    assert_eq!(ids(&sessions[0]), vec![4]);
  }

  #[test]
  fn simultaneous_mains_are_distinct_boundaries_ordered_by_id() {
    let sessions = all_sessions(vec![
      rec(2, Main, 0, BOX_A),
      rec(1, Main, 0, BOX_A),
      rec(3, Revealed, 1, BOX_A),
    ]);
    assert_eq!(sessions.len(), 2);
    // Equal start times keep ascending id order.
    assert_eq!(sessions[0].session_id, SessionId::Main(1));
    assert_eq!(ids(&sessions[0]), vec![1]);
    assert_eq!(sessions[1].session_id, SessionId::Main(2));
    assert_eq!(ids(&sessions[1]), vec![2, 3]);
  }

  #[test]
  fn input_order_does_not_matter() {
    let forward = vec![
      rec(1, Main, 0, BOX_A),
      rec(2, Revealed, 10, BOX_A),
      rec(3, Revealed, 20, BOX_B),
      rec(4, Main, 30, BOX_B),
      rec(5, Revealed, 40, BOX_B),
    ];
    let mut backward = forward.clone();
    backward.reverse();
    assert_eq!(all_sessions(forward), all_sessions(backward));
  }

  #[test]
  fn session_ids_serialise_as_strings() {
    assert_eq!(serde_json::to_value(SessionId::Main(42)).unwrap(), "42");
    assert_eq!(serde_json::to_value(SessionId::Orphan(3)).unwrap(), "orph-3");
  }

  // ── Pagination ────────────────────────────────────────────────────────────

  #[test]
  fn coerce_fixes_bad_pagination_values() {
    assert_eq!(PageRequest::coerce(None, None), PageRequest { limit: 10, offset: 0 });
    assert_eq!(PageRequest::coerce(Some(0), Some(-5)), PageRequest { limit: 10, offset: 0 });
    assert_eq!(PageRequest::coerce(Some(-1), Some(3)), PageRequest { limit: 10, offset: 3 });
    assert_eq!(PageRequest::coerce(Some(4), Some(2)), PageRequest { limit: 4, offset: 2 });
  }

  #[test]
  fn pages_walk_sessions_newest_first() {
    let records = (0..5).map(|i| rec(i + 1, Main, i * 120, BOX_A)).collect();
    let builder = DiscoverySessionBuilder::new(records);

    let first = builder.page(PageRequest { limit: 2, offset: 0 }, t0());
    assert!(first.has_more);
    assert_eq!(first.next_offset, 2);
    let started: Vec<_> = first.sessions.iter().map(|s| s.session_id).collect();
    assert_eq!(started, vec![SessionId::Main(5), SessionId::Main(4)]);

    let last = builder.page(PageRequest { limit: 2, offset: 4 }, t0());
    assert_eq!(last.sessions.len(), 1);
    assert!(!last.has_more);
    assert_eq!(last.next_offset, 5);
  }

  #[test]
  fn offset_past_the_end_advances_flatly() {
    let builder = DiscoverySessionBuilder::new(vec![rec(1, Main, 0, BOX_A)]);
    let page = builder.page(PageRequest { limit: 10, offset: 20 }, t0());
    assert!(page.sessions.is_empty());
    assert!(!page.has_more);
    assert_eq!(page.next_offset, 20);
  }

  // ── Invariants over a generated log ───────────────────────────────────────

  /// A deterministic mixed log: three boxes, roughly one main in four, gaps
  /// of 0–40 minutes (repeated timestamps included).
  fn generated_log(len: usize, seed: u64) -> Vec<DiscoveryRecord> {
    let mut state = seed;
    let mut next = move || {
      state ^= state << 13;
      state ^= state >> 7;
      state ^= state << 17;
      state
    };
    let mut at = t0();
    (0..len)
      .map(|i| {
        at += Duration::minutes((next() % 41) as i64);
        let kind = if next() % 4 == 0 { Main } else { Revealed };
        let box_id = (next() % 3) as BoxId + 1;
        rec_at(i as EventId + 1, kind, at, box_id)
      })
      .collect()
  }

  #[test]
  fn generated_logs_respect_session_invariants() {
    for seed in [1_u64, 7, 42, 1234, 99_991] {
      let log = generated_log(200, seed);
      let by_id: HashMap<i64, DiscoveryRecord> =
        log.iter().map(|r| (r.event.deposit_id, r.clone())).collect();
      let sessions = all_sessions(log.clone());

      // Partition: every event exactly once.
      let mut seen = HashSet::new();
      for s in &sessions {
        for d in &s.deposits {
          assert!(seen.insert(d.deposit_id), "seed {seed}: {} duplicated", d.deposit_id);
        }
      }
      assert_eq!(seen.len(), log.len(), "seed {seed}: events dropped");

      // Ordering across sessions.
      for pair in sessions.windows(2) {
        assert!(pair[0].started_at >= pair[1].started_at, "seed {seed}");
      }

      for s in &sessions {
        // Ordering within a session.
        for pair in s.deposits.windows(2) {
          assert!(pair[0].discovered_at <= pair[1].discovered_at, "seed {seed}");
        }
        // Only the head may be a main, and only main sessions have one.
        let head_is_main = s.deposits[0].kind == Main;
        assert_eq!(head_is_main, matches!(s.session_id, SessionId::Main(_)));
        assert!(s.deposits[1..].iter().all(|d| d.kind == Revealed));

        // Window and box.
        for d in &s.deposits[1..] {
          assert!(d.discovered_at - s.started_at <= session_window(), "seed {seed}");
          assert_eq!(box_of(&by_id[&d.deposit_id]), s.music_box.id, "seed {seed}");
        }

        // Boundary: no main of any box falls strictly inside the session.
        let last = s.deposits.last().unwrap().discovered_at;
        let head_id = s.deposits[0].deposit_id;
        for r in &log {
          let e = &r.event;
          if e.discovered_type == Main && e.deposit_id != head_id {
            let after_head = (e.discovered_at, e.id) > (s.started_at, head_id);
            let before_last = e.discovered_at < last;
            assert!(!(after_head && before_last), "seed {seed}: main {} inside session", e.id);
          }
        }
      }
    }
  }

  #[test]
  fn paging_through_everything_sees_every_session_once() {
    let builder = DiscoverySessionBuilder::new(generated_log(150, 5));
    let now = t0();
    let mut offset = 0;
    let mut collected = Vec::new();
    loop {
      let page = builder.page(PageRequest { limit: 7, offset }, now);
      collected.extend(page.sessions);
      if !page.has_more {
        break;
      }
      offset = page.next_offset;
    }
    assert_eq!(collected, builder.sessions(now));
  }

  #[test]
  fn rebuilding_is_idempotent() {
    let log = generated_log(80, 17);
    let now = t0();
    let a = DiscoverySessionBuilder::new(log.clone()).page(PageRequest::default(), now);
    let b = DiscoverySessionBuilder::new(log).page(PageRequest::default(), now);
    assert_eq!(a, b);
  }
}
