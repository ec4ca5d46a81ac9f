//! Domain model structs persisted in the local database.

use azdocs_shared::token::Claims;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session: the opaque bearer token and the claims decoded
/// from it. A session without a token does not exist; callers treat a missing
/// token as logged out regardless of any stored claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub claims: Claims,
}

impl Session {
    pub fn new(token: impl Into<String>, claims: Claims) -> Self {
        Self {
            token: token.into(),
            claims,
        }
    }
}

/// One row of the key-value table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
