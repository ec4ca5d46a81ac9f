//! Sign-in callback and sign-out.

use azdocs_shared::constants::TOKEN_QUERY_PARAM;
use azdocs_shared::token::decode_claims;
use azdocs_store::{Result, Session};
use reqwest::Url;
use tracing::{info, warn};

use crate::routing::Route;
use crate::session::SessionContext;

/// Pull the `token` query parameter out of a callback URL. Accepts a full
/// URL, a path with a query (`/auth/callback?token=...`), a query string
/// with or without its leading `?`, or a bare token. Empty values count as
/// absent.
pub fn extract_token(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let url = match Url::parse(input) {
        Ok(url) if url.has_host() => url,
        _ => {
            let relative = if input.contains('?') || input.starts_with('/') {
                input.to_string()
            } else if is_query(input) {
                format!("?{input}")
            } else {
                // Anything else is the token itself, base64 padding included.
                return Some(input.to_string());
            };
            Url::parse("http://localhost/").ok()?.join(&relative).ok()?
        }
    };

    url.query_pairs()
        .find(|(key, _)| key == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Whether a `?`-less input reads as a query string carrying the token.
fn is_query(input: &str) -> bool {
    input
        .split('&')
        .any(|pair| pair.split_once('=').is_some_and(|(key, _)| key == TOKEN_QUERY_PARAM))
}

/// Handle the identity provider's redirect: persist the token and its
/// decoded claims, then go to the chat view. Without a usable token nothing
/// is written and the visitor goes back to login.
pub fn handle_callback(input: &str, session: &mut SessionContext) -> Result<Route> {
    let Some(token) = extract_token(input) else {
        warn!("auth callback carried no token");
        return Ok(Route::Login);
    };

    let claims = match decode_claims(&token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "auth callback token could not be decoded");
            return Ok(Route::Login);
        }
    };

    session.establish(Session::new(token, claims))?;
    Ok(Route::Chat(None))
}

/// Forget every trace of the session and return to login.
pub fn logout(session: &mut SessionContext) -> Result<Route> {
    session.clear()?;
    info!("logged out");
    Ok(Route::Login)
}

#[cfg(test)]
mod tests {
    use super::*;
    use azdocs_shared::constants::{KEY_AUTH_TOKEN, KEY_USER_INFO, LEGACY_KEY_TOKEN, LEGACY_KEY_USER};
    use azdocs_shared::token::encode_segment;
    use serde_json::json;

    fn jwt() -> String {
        format!(
            "{}.{}.c2ln",
            encode_segment(&json!({"alg": "RS256"})),
            encode_segment(&json!({"sub": "oid", "name": "Ada", "email": "ada@example.com"}))
        )
    }

    #[test]
    fn extracts_from_every_shape() {
        let token = jwt();
        for input in [
            format!("http://localhost:3000/auth/callback?token={token}"),
            format!("/auth/callback?state=x&token={token}"),
            format!("?token={token}"),
            format!("token={token}"),
            token.clone(),
        ] {
            assert_eq!(extract_token(&input).as_deref(), Some(token.as_str()), "{input}");
        }
    }

    #[test]
    fn padded_bare_token_is_kept_whole() {
        let padded = format!("{}==", jwt().replace(".c2ln", ""));
        let token = format!("{padded}.c2ln");
        assert!(decode_claims(&token).is_ok());
        assert_eq!(extract_token(&token).as_deref(), Some(token.as_str()));
        assert_eq!(
            extract_token(&format!("state=x&token={token}")).as_deref(),
            Some(token.as_str())
        );
    }

    #[test]
    fn missing_or_empty_token_is_none() {
        assert_eq!(extract_token(""), None);
        assert_eq!(extract_token("http://localhost:3000/auth/callback"), None);
        assert_eq!(extract_token("?token="), None);
        assert_eq!(extract_token("?state=abc"), None);
    }

    #[test]
    fn callback_persists_session() {
        let mut session = SessionContext::in_memory().unwrap();
        let route = handle_callback(&format!("?token={}", jwt()), &mut session).unwrap();

        assert_eq!(route, Route::Chat(None));
        assert_eq!(session.token(), Some(jwt().as_str()));
        assert_eq!(session.claims().unwrap().name(), Some("Ada"));
        assert!(session.database().get_value(KEY_USER_INFO).unwrap().is_some());
    }

    #[test]
    fn callback_without_token_persists_nothing() {
        let mut session = SessionContext::in_memory().unwrap();

        assert_eq!(handle_callback("/auth/callback", &mut session).unwrap(), Route::Login);
        assert_eq!(handle_callback("?token=not-a-jwt", &mut session).unwrap(), Route::Login);

        assert!(!session.is_authenticated());
        assert!(session.database().list_entries().unwrap().is_empty());
    }

    #[test]
    fn logout_clears_canonical_and_legacy_keys() {
        let mut session = SessionContext::in_memory().unwrap();
        handle_callback(&format!("?token={}", jwt()), &mut session).unwrap();
        session.database().set_value(LEGACY_KEY_TOKEN, "old").unwrap();
        session.database().set_value(LEGACY_KEY_USER, "{}").unwrap();

        assert_eq!(logout(&mut session).unwrap(), Route::Login);
        assert!(!session.is_authenticated());
        for key in [KEY_AUTH_TOKEN, KEY_USER_INFO, LEGACY_KEY_TOKEN, LEGACY_KEY_USER] {
            assert_eq!(session.database().get_value(key).unwrap(), None, "{key}");
        }
    }
}
