//! HTTP Basic-auth extractor backed by the users table.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{FromRequestParts, OptionalFromRequestParts},
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use dropbox_core::{store::DropboxStore, user::User};
use rand_core::OsRng;

use crate::{AppState, error::ApiError};

/// The user a request was authenticated as.
///
/// As `Option<Authenticated>` the extractor admits anonymous requests: no
/// `Authorization` header yields `None`, while bad credentials are still
/// rejected with 401.
pub struct Authenticated(pub User);

/// Hash `password` into an argon2 PHC string suitable for
/// [`User::password_hash`].
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Check `password` against a PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

/// Decode `Authorization: Basic ...` into `(username, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (username, password) = creds.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: DropboxStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (username, password) = basic_credentials(&parts.headers).ok_or(ApiError::Unauthorized)?;

    let user = state
      .store
      .get_user_by_username(&username)
      .await
      .map_err(ApiError::from_store)?
      .ok_or(ApiError::Unauthorized)?;

    let verified = user
      .password_hash
      .as_deref()
      .is_some_and(|phc| verify_password(&password, phc));
    if !verified {
      tracing::debug!(%username, "rejected credentials");
      return Err(ApiError::Unauthorized);
    }

    Ok(Authenticated(user))
  }
}

impl<S> OptionalFromRequestParts<AppState<S>> for Authenticated
where
  S: DropboxStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Option<Self>, Self::Rejection> {
    if !parts.headers.contains_key(header::AUTHORIZATION) {
      return Ok(None);
    }
    <Self as FromRequestParts<AppState<S>>>::from_request_parts(parts, state)
      .await
      .map(Some)
  }
}
