//! Error types for `dropbox-core`.

use thiserror::Error;

use crate::{
  catalog::{BoxId, DepositId, SongId},
  user::UserId,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("deposit not found: {0}")]
  DepositNotFound(DepositId),

  #[error("box not found: {0}")]
  BoxNotFound(BoxId),

  #[error("song not found: {0}")]
  SongNotFound(SongId),

  #[error("username already taken: {0:?}")]
  UsernameTaken(String),

  #[error("deposit {deposit_id} is already discovered by user {user_id}")]
  AlreadyDiscovered {
    user_id:    UserId,
    deposit_id: DepositId,
  },

  #[error("insufficient funds: balance {balance}, required {required}")]
  InsufficientFunds { balance: i64, required: i64 },

  #[error("unknown discovered type: {0:?}")]
  UnknownDiscoveredType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Access to the domain failure wrapped inside a backend-specific error.
///
/// Storage backends surface constraint violations (duplicate discovery,
/// missing deposit, ...) as [`Error`] values wrapped in their own error type.
/// The HTTP layer uses this to pick a status code without knowing which
/// backend produced the error.
pub trait AsDomainError {
  fn as_domain(&self) -> Option<&Error>;
}

impl AsDomainError for Error {
  fn as_domain(&self) -> Option<&Error> { Some(self) }
}

impl AsDomainError for std::convert::Infallible {
  fn as_domain(&self) -> Option<&Error> { match *self {} }
}
