//! # azdocs-server
//!
//! Development backend for the AzDocs chat client.
//!
//! It implements the same HTTP surface as the production assistant API so
//! the client can be exercised end to end without cloud services:
//! - **`/login`** mints a signed token for a configured dev user and
//!   redirects to the frontend callback, standing in for the identity
//!   provider
//! - **Conversations** are kept in memory per user
//! - **`/api/chat`** answers from the names of uploaded documents, with
//!   references, and records the exchange in the conversation
//! - **PDF uploads** are written to disk and served back under `/blobs`
//!   to callers whose token clearance covers the document's access level

pub mod api;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod conversations;
pub mod error;
pub mod uploads;

pub use api::{build_router, serve, serve_on, AppState};
pub use config::ServerConfig;
pub use error::ServerError;
