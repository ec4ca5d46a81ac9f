//! # azdocs-shared
//!
//! Types shared by the AzDocs chat client and the development backend:
//! the conversation/message domain model, the JSON bodies exchanged over
//! HTTP, and the helpers that read identity claims out of a bearer token.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod token;
pub mod types;

pub use error::{SharedError, TokenError};
