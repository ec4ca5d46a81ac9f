//! Bearer token helpers.
//!
//! Tokens are JWT-shaped: `header.payload.signature`, each segment base64url
//! encoded. The client never verifies the signature; verification happened
//! upstream before the identity provider redirected back with the token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TokenError;

/// Identity claims carried in the token payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(pub Map<String, Value>);

impl Claims {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn str_claim(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_claim("name")
    }

    pub fn email(&self) -> Option<&str> {
        self.str_claim("email")
            .or_else(|| self.str_claim("preferred_username"))
    }

    pub fn roles(&self) -> Vec<&str> {
        self.0
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| roles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.0.get("exp")?;
        let secs = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;
        DateTime::from_timestamp(secs, 0)
    }

    /// Best display name for greetings: name, then email, then subject.
    pub fn display_name(&self) -> Option<&str> {
        self.name().or_else(|| self.email()).or_else(|| self.subject())
    }
}

/// Decode the claims of a token without checking its signature.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Empty);
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(segments.len()));
    }

    let value = decode_segment(segments[1])?;
    match value {
        Value::Object(map) => Ok(Claims(map)),
        _ => Err(TokenError::NotAnObject),
    }
}

/// Decode one base64url segment as JSON. Trailing `=` padding is tolerated.
pub fn decode_segment(segment: &str) -> Result<Value, TokenError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Encode a JSON value as one unpadded base64url segment.
pub fn encode_segment(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_for(payload: Value) -> String {
        format!(
            "{}.{}.sig",
            encode_segment(&json!({"alg": "HS256", "typ": "JWT"})),
            encode_segment(&payload)
        )
    }

    #[test]
    fn decodes_claims() {
        let token = token_for(json!({
            "sub": "oid-1",
            "email": "ada@example.com",
            "name": "Ada",
            "roles": ["reader", 7, "admin"],
            "exp": 1_900_000_000
        }));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.subject(), Some("oid-1"));
        assert_eq!(claims.name(), Some("Ada"));
        assert_eq!(claims.email(), Some("ada@example.com"));
        assert_eq!(claims.roles(), vec!["reader", "admin"]);
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_900_000_000);
    }

    #[test]
    fn padded_payload_is_accepted() {
        let token = token_for(json!({"sub": "x"}));
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1].push_str("==");
        let claims = decode_claims(&parts.join(".")).unwrap();
        assert_eq!(claims.subject(), Some("x"));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(decode_claims(""), Err(TokenError::Empty)));
        assert!(matches!(decode_claims("a.b"), Err(TokenError::Malformed(2))));
        assert!(decode_claims("a.!!!.c").is_err());

        let array_payload = token_for(json!([1, 2]));
        assert!(matches!(
            decode_claims(&array_payload),
            Err(TokenError::NotAnObject)
        ));
    }

    #[test]
    fn display_name_falls_back() {
        let claims = decode_claims(&token_for(json!({"sub": "s"}))).unwrap();
        assert_eq!(claims.display_name(), Some("s"));
    }
}
