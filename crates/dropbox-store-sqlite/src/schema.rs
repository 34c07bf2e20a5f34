//! SQL schema for the dropbox SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
///
/// Timestamps are fixed-width RFC 3339 strings (microseconds, `Z`), so text
/// comparison orders them chronologically.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,
    display_name    TEXT NOT NULL DEFAULT '',
    profile_pic_url TEXT,
    points          INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
    password_hash   TEXT,            -- argon2 PHC string
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS boxes (
    box_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    url         TEXT NOT NULL UNIQUE,
    image_url   TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS songs (
    song_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    artist      TEXT NOT NULL,
    spotify_url TEXT,
    deezer_url  TEXT,
    image_url   TEXT,
    duration    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS deposits (
    deposit_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    box_id       INTEGER NOT NULL REFERENCES boxes(box_id),
    song_id      INTEGER NOT NULL REFERENCES songs(song_id),
    user_id      INTEGER REFERENCES users(user_id),   -- NULL when anonymous
    deposited_at TEXT NOT NULL
);

-- Discoveries are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS discoveries (
    discovery_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER NOT NULL REFERENCES users(user_id),
    deposit_id      INTEGER NOT NULL REFERENCES deposits(deposit_id),
    discovered_type TEXT NOT NULL CHECK (discovered_type IN ('main', 'revealed')),
    discovered_at   TEXT NOT NULL,
    UNIQUE (user_id, deposit_id)
);

CREATE INDEX IF NOT EXISTS deposits_box_idx        ON deposits(box_id);
CREATE INDEX IF NOT EXISTS deposits_user_idx       ON deposits(user_id, deposited_at);
CREATE INDEX IF NOT EXISTS discoveries_user_at_idx ON discoveries(user_id, discovered_at);

PRAGMA user_version = 1;
";
