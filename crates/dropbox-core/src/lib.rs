//! Core types and trait definitions for the dropbox backend.
//!
//! This crate is free of HTTP and database dependencies. Session
//! reconstruction lives here as a pure function of a user's discovery log.

// Native `async fn` in traits; the trait spells out `Send` futures itself.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod discovery;
pub mod error;
pub mod humanize;
pub mod render;
pub mod session;
pub mod store;
pub mod user;

pub use error::{AsDomainError, Error, Result};
pub use session::{DiscoverySessionBuilder, PageRequest, Session, SessionPage};
pub use store::DropboxStore;
