//! # azdocs-store
//!
//! Local persistent storage for the AzDocs client, backed by SQLite.
//!
//! The store plays the part browser local storage plays for a web client:
//! a small key-value table holding the bearer token and the identity claims
//! decoded from it, under fixed key names. The crate exposes a synchronous
//! [`Database`] handle with typed helpers for the session.

pub mod database;
pub mod kv;
pub mod migrations;
pub mod models;
pub mod session;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
