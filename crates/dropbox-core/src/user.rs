//! Users: the people who deposit and discover songs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned user identifier.
pub type UserId = i64;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:         UserId,
  pub username:        String,
  /// Full name chosen by the user; empty when never set.
  pub display_name:    String,
  pub profile_pic_url: Option<String>,
  /// Current points balance. The store is the ledger of record.
  pub points:          i64,
  /// Argon2 PHC string used for Basic authentication. Never serialised.
  #[serde(skip)]
  pub password_hash:   Option<String>,
  pub created_at:      DateTime<Utc>,
}

impl User {
  /// Name shown next to the user's deposits: the full name, falling back to
  /// the username.
  pub fn shown_name(&self) -> &str {
    if self.display_name.trim().is_empty() {
      &self.username
    } else {
      &self.display_name
    }
  }
}

/// Input to [`crate::store::DropboxStore::add_user`].
#[derive(Debug, Clone, Default)]
pub struct NewUser {
  pub username:        String,
  pub display_name:    String,
  pub profile_pic_url: Option<String>,
  pub password_hash:   Option<String>,
}

impl NewUser {
  pub fn new(username: impl Into<String>) -> Self {
    Self { username: username.into(), ..Self::default() }
  }
}
