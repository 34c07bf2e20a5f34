//! [`SqliteStore`], the SQLite implementation of [`DropboxStore`].

use std::path::Path;

use dropbox_core::{
  catalog::{
    BoxId, Deposit, DepositDetail, DepositId, MusicBox, NewBox, NewDeposit, NewSong, Song,
  },
  discovery::{DiscoveredType, DiscoveryEvent, DiscoveryRecord, NewDiscovery, Reveal},
  store::DropboxStore,
  user::{NewUser, User, UserId},
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};

use crate::{
  encode::{
    BOX_COLUMNS, DETAIL_COLUMNS, DETAIL_JOINS, EVENT_COLUMNS, RawBox, RawDepositDetail,
    RawDiscoveryEvent, RawDiscoveryRecord, RawSong, RawUser, SONG_COLUMNS, USER_COLUMNS,
    encode_discovered_type, encode_dt, now,
  },
  schema::SCHEMA,
  Error, Result,
};

/// Outcome of a closure run on the connection thread: domain failures are
/// detected there but surfaced as [`Error::Core`] afterwards.
type Checked<T> = std::result::Result<T, dropbox_core::Error>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A dropbox store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Connection-thread helpers ───────────────────────────────────────────────

fn row_exists(conn: &Connection, sql: &str, id: i64) -> rusqlite::Result<bool> {
  Ok(conn.query_row(sql, [id], |_| Ok(())).optional()?.is_some())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn user_points(conn: &Connection, user_id: UserId) -> rusqlite::Result<Option<i64>> {
  conn
    .query_row("SELECT points FROM users WHERE user_id = ?1", [user_id], |r| r.get(0))
    .optional()
}

fn already_discovered(
  conn: &Connection,
  user_id: UserId,
  deposit_id: DepositId,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM discoveries WHERE user_id = ?1 AND deposit_id = ?2",
        rusqlite::params![user_id, deposit_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn insert_discovery(
  conn: &Connection,
  user_id: UserId,
  deposit_id: DepositId,
  kind: DiscoveredType,
  at: &str,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO discoveries (user_id, deposit_id, discovered_type, discovered_at)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![user_id, deposit_id, encode_discovered_type(kind), at],
  )?;
  Ok(conn.last_insert_rowid())
}

// ─── DropboxStore impl ───────────────────────────────────────────────────────

impl DropboxStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let created_at = now();
    let at_str = encode_dt(created_at);
    let username = input.username.clone();
    let display_name = input.display_name.clone();
    let profile_pic_url = input.profile_pic_url.clone();
    let password_hash = input.password_hash.clone();

    let inserted: Checked<i64> = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO users (username, display_name, profile_pic_url, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![username, display_name, profile_pic_url, password_hash, at_str],
        );
        match res {
          Ok(_) => Ok(Ok(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => {
            Ok(Err(dropbox_core::Error::UsernameTaken(username)))
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(User {
      user_id: inserted?,
      username: input.username,
      display_name: input.display_name,
      profile_pic_url: input.profile_pic_url,
      points: 0,
      password_hash: input.password_hash,
      created_at,
    })
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1"),
              [username],
              |row| RawUser::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn add_points(&self, user_id: UserId, delta: i64) -> Result<i64> {
    let balance: Checked<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(points) = user_points(&tx, user_id)? else {
          return Ok(Err(dropbox_core::Error::UserNotFound(user_id)));
        };
        let balance = points + delta;
        if balance < 0 {
          return Ok(Err(dropbox_core::Error::InsufficientFunds {
            balance:  points,
            required: -delta,
          }));
        }
        tx.execute(
          "UPDATE users SET points = ?1 WHERE user_id = ?2",
          rusqlite::params![balance, user_id],
        )?;
        tx.commit()?;
        Ok(Ok(balance))
      })
      .await?;

    Ok(balance?)
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn add_box(&self, input: NewBox) -> Result<MusicBox> {
    let created_at = now();
    let at_str = encode_dt(created_at);
    let (name, description, url, image_url) = (
      input.name.clone(),
      input.description.clone(),
      input.url.clone(),
      input.image_url.clone(),
    );

    let box_id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO boxes (name, description, url, image_url, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![name, description, url, image_url, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(MusicBox {
      box_id,
      name: input.name,
      description: input.description,
      url: input.url,
      image_url: input.image_url,
      created_at,
    })
  }

  async fn get_box_by_url(&self, url: &str) -> Result<Option<MusicBox>> {
    let url = url.to_owned();

    let raw: Option<RawBox> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {BOX_COLUMNS} FROM boxes b WHERE b.url = ?1"),
              [url],
              |row| RawBox::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBox::into_box).transpose()
  }

  async fn count_box_deposits(&self, box_id: BoxId) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM deposits WHERE box_id = ?1",
          [box_id],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(u64::try_from(count).unwrap_or_default())
  }

  async fn upsert_song(&self, input: NewSong) -> Result<Song> {
    let NewSong { title, artist, spotify_url, deezer_url, image_url, duration } = input;

    let raw: RawSong = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing: Option<i64> = tx
          .query_row(
            "SELECT song_id FROM songs
             WHERE title = ?1 COLLATE NOCASE AND artist = ?2 COLLATE NOCASE
             ORDER BY song_id LIMIT 1",
            rusqlite::params![title, artist],
            |r| r.get(0),
          )
          .optional()?;

        let song_id = match existing {
          Some(id) => {
            tx.execute(
              "UPDATE songs SET
                 spotify_url = COALESCE(?1, spotify_url),
                 deezer_url  = COALESCE(?2, deezer_url),
                 image_url   = COALESCE(image_url, ?3),
                 duration    = CASE WHEN duration = 0 THEN ?4 ELSE duration END
               WHERE song_id = ?5",
              rusqlite::params![spotify_url, deezer_url, image_url, duration, id],
            )?;
            id
          }
          None => {
            tx.execute(
              "INSERT INTO songs (title, artist, spotify_url, deezer_url, image_url, duration)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
              rusqlite::params![title, artist, spotify_url, deezer_url, image_url, duration],
            )?;
            tx.last_insert_rowid()
          }
        };

        let song = tx.query_row(
          &format!("SELECT {SONG_COLUMNS} FROM songs s WHERE s.song_id = ?1"),
          [song_id],
          |row| RawSong::from_row(row, 0),
        )?;
        tx.commit()?;
        Ok(song)
      })
      .await?;

    tracing::debug!(song_id = raw.song_id, "upserted song");
    Ok(raw.into_song())
  }

  async fn add_deposit(&self, input: NewDeposit) -> Result<Deposit> {
    let deposited_at = input.deposited_at.unwrap_or_else(now);
    let at_str = encode_dt(deposited_at);
    let NewDeposit { box_id, song_id, user_id, .. } = input;

    let deposit_id: Checked<i64> = self
      .conn
      .call(move |conn| {
        if !row_exists(conn, "SELECT 1 FROM boxes WHERE box_id = ?1", box_id)? {
          return Ok(Err(dropbox_core::Error::BoxNotFound(box_id)));
        }
        if !row_exists(conn, "SELECT 1 FROM songs WHERE song_id = ?1", song_id)? {
          return Ok(Err(dropbox_core::Error::SongNotFound(song_id)));
        }
        if let Some(uid) = user_id {
          if !row_exists(conn, "SELECT 1 FROM users WHERE user_id = ?1", uid)? {
            return Ok(Err(dropbox_core::Error::UserNotFound(uid)));
          }
        }
        conn.execute(
          "INSERT INTO deposits (box_id, song_id, user_id, deposited_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![box_id, song_id, user_id, at_str],
        )?;
        Ok(Ok(conn.last_insert_rowid()))
      })
      .await?;

    Ok(Deposit { deposit_id: deposit_id?, box_id, song_id, user_id, deposited_at })
  }

  async fn get_deposit(&self, id: DepositId) -> Result<Option<DepositDetail>> {
    let raw: Option<RawDepositDetail> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {DETAIL_COLUMNS} FROM deposits p {DETAIL_JOINS}
                 WHERE p.deposit_id = ?1"
              ),
              [id],
              |row| RawDepositDetail::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDepositDetail::into_detail).transpose()
  }

  async fn list_box_deposits(&self, box_id: BoxId, limit: usize) -> Result<Vec<DepositDetail>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawDepositDetail> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DETAIL_COLUMNS} FROM deposits p {DETAIL_JOINS}
           WHERE p.box_id = ?1
           ORDER BY p.deposited_at DESC, p.deposit_id DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![box_id, limit_val], |row| {
            RawDepositDetail::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDepositDetail::into_detail).collect()
  }

  async fn list_user_deposits(
    &self,
    user_id: UserId,
    limit: usize,
  ) -> Result<Vec<DepositDetail>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawDepositDetail> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DETAIL_COLUMNS} FROM deposits p {DETAIL_JOINS}
           WHERE p.user_id = ?1
           ORDER BY p.deposited_at DESC, p.deposit_id DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, limit_val], |row| {
            RawDepositDetail::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDepositDetail::into_detail).collect()
  }

  // ── Discoveries ───────────────────────────────────────────────────────────

  async fn record_discovery(&self, input: NewDiscovery) -> Result<DiscoveryEvent> {
    let discovered_at = input.discovered_at.unwrap_or_else(now);
    let at_str = encode_dt(discovered_at);
    let NewDiscovery { user_id, deposit_id, discovered_type, .. } = input;

    let id: Checked<i64> = self
      .conn
      .call(move |conn| {
        if !row_exists(conn, "SELECT 1 FROM deposits WHERE deposit_id = ?1", deposit_id)? {
          return Ok(Err(dropbox_core::Error::DepositNotFound(deposit_id)));
        }
        if !row_exists(conn, "SELECT 1 FROM users WHERE user_id = ?1", user_id)? {
          return Ok(Err(dropbox_core::Error::UserNotFound(user_id)));
        }
        match insert_discovery(conn, user_id, deposit_id, discovered_type, &at_str) {
          Ok(id) => Ok(Ok(id)),
          Err(e) if is_unique_violation(&e) => {
            Ok(Err(dropbox_core::Error::AlreadyDiscovered { user_id, deposit_id }))
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let event = DiscoveryEvent {
      id: id?,
      user_id,
      deposit_id,
      discovered_type,
      discovered_at,
    };
    tracing::debug!(
      user_id,
      deposit_id,
      kind = %discovered_type,
      event_id = event.id,
      "recorded discovery"
    );
    Ok(event)
  }

  async fn list_discoveries(
    &self,
    user_id: UserId,
    max_events: Option<usize>,
  ) -> Result<Vec<DiscoveryRecord>> {
    // SQLite treats a negative LIMIT as "no limit".
    let limit_val = max_events
      .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
      .unwrap_or(-1);

    let raws: Vec<RawDiscoveryRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS}, {DETAIL_COLUMNS}
           FROM discoveries d
           JOIN deposits p ON p.deposit_id = d.deposit_id
           {DETAIL_JOINS}
           WHERE d.user_id = ?1
           ORDER BY d.discovered_at DESC, d.discovery_id DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, limit_val], RawDiscoveryRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDiscoveryRecord::into_record).collect()
  }

  async fn find_discoveries(
    &self,
    user_id: UserId,
    deposit_ids: &[DepositId],
  ) -> Result<Vec<DiscoveryEvent>> {
    if deposit_ids.is_empty() {
      return Ok(Vec::new());
    }
    let deposit_ids = deposit_ids.to_vec();

    let raws: Vec<RawDiscoveryEvent> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; deposit_ids.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM discoveries d
           WHERE d.user_id = ? AND d.deposit_id IN ({placeholders})"
        ))?;
        let params = std::iter::once(user_id).chain(deposit_ids);
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            RawDiscoveryEvent::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDiscoveryEvent::into_event).collect()
  }

  async fn reveal_deposit(
    &self,
    user_id: UserId,
    deposit_id: DepositId,
    cost: i64,
  ) -> Result<Reveal> {
    let at_str = encode_dt(now());

    let outcome: Checked<(RawSong, i64, bool)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let song = tx
          .query_row(
            &format!(
              "SELECT {SONG_COLUMNS} FROM deposits p
               JOIN songs s ON s.song_id = p.song_id
               WHERE p.deposit_id = ?1"
            ),
            [deposit_id],
            |row| RawSong::from_row(row, 0),
          )
          .optional()?;
        let Some(song) = song else {
          return Ok(Err(dropbox_core::Error::DepositNotFound(deposit_id)));
        };

        let Some(points) = user_points(&tx, user_id)? else {
          return Ok(Err(dropbox_core::Error::UserNotFound(user_id)));
        };

        if already_discovered(&tx, user_id, deposit_id)? {
          return Ok(Ok((song, points, true)));
        }

        if points < cost {
          return Ok(Err(dropbox_core::Error::InsufficientFunds {
            balance:  points,
            required: cost,
          }));
        }

        let balance = points - cost;
        tx.execute(
          "UPDATE users SET points = ?1 WHERE user_id = ?2",
          rusqlite::params![balance, user_id],
        )?;
        insert_discovery(&tx, user_id, deposit_id, DiscoveredType::Revealed, &at_str)?;
        tx.commit()?;

        Ok(Ok((song, balance, false)))
      })
      .await?;

    let (song, points_balance, already_discovered) = outcome?;
    tracing::debug!(user_id, deposit_id, points_balance, already_discovered, "revealed deposit");

    Ok(Reveal { song: song.into_song(), points_balance, already_discovered })
  }
}
