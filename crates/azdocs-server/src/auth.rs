//! Token issuing and verification.
//!
//! Tokens are JWT-shaped (`header.payload.signature`). The signature is a
//! keyed BLAKE3 hash of `header.payload`, with the key derived from the
//! configured secret. The client only ever decodes the payload.

use axum::http::HeaderMap;
use azdocs_shared::token::{decode_claims, encode_segment, Claims};
use azdocs_shared::types::AccessLevel;
use chrono::Utc;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::error::ServerError;

const KEY_CONTEXT: &str = "azdocs-server dev token signing key v1";

/// Claim holding the highest access level the bearer may read.
const CLEARANCE_CLAIM: &str = "clearance";

/// Identity of the caller, taken from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    /// Tokens without a readable clearance only see public documents.
    pub clearance: AccessLevel,
}

pub struct TokenIssuer {
    key: [u8; 32],
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Mint a token for the given identity.
    pub fn issue(&self, user_id: &str, name: &str, email: &str, clearance: AccessLevel) -> String {
        let header = encode_segment(&json!({"alg": "BLAKE3", "typ": "JWT"}));
        let payload = encode_segment(&json!({
            "sub": user_id,
            "name": name,
            "email": email,
            "roles": [],
            CLEARANCE_CLAIM: clearance.value(),
            "exp": Utc::now().timestamp() + self.ttl_secs,
        }));
        let signing_input = format!("{header}.{payload}");
        let signature = self.sign(&signing_input);
        format!("{signing_input}.{signature}")
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, ServerError> {
        let (signing_input, signature) = token
            .rsplit_once('.')
            .ok_or(ServerError::Unauthorized)?;

        let expected = self.sign(signing_input);
        if expected.as_bytes().ct_eq(signature.as_bytes()).unwrap_u8() != 1 {
            return Err(ServerError::Unauthorized);
        }

        let claims = decode_claims(token).map_err(|_| ServerError::Unauthorized)?;
        match claims.expires_at() {
            Some(exp) if exp > Utc::now() => Ok(claims),
            _ => Err(ServerError::Unauthorized),
        }
    }

    /// Authenticate a request from its `Authorization: Bearer` header.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, ServerError> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(ServerError::Unauthorized)?;

        let token = auth
            .strip_prefix("Bearer ")
            .ok_or(ServerError::Unauthorized)?;

        let claims = self.verify(token.trim())?;
        let user_id = claims
            .subject()
            .ok_or(ServerError::Unauthorized)?
            .to_string();

        let clearance = claims
            .get(CLEARANCE_CLAIM)
            .and_then(|v| v.as_i64())
            .and_then(|n| AccessLevel::try_from(n).ok())
            .unwrap_or_default();

        Ok(AuthUser { user_id, clearance })
    }

    fn sign(&self, signing_input: &str) -> String {
        blake3::keyed_hash(&self.key, signing_input.as_bytes())
            .to_hex()
            .to_string()
    }
}
