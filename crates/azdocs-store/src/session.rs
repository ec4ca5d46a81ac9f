//! Session persistence on top of the key-value table.
//!
//! The canonical schema is `authToken` (raw token) and `userInfo` (claims as
//! JSON). Older clients wrote `token` and `user`; those are read when the
//! canonical keys are absent and are always removed on save and clear.

use azdocs_shared::constants::{KEY_AUTH_TOKEN, KEY_USER_INFO, LEGACY_KEY_TOKEN, LEGACY_KEY_USER};
use azdocs_shared::token::{decode_claims, Claims};
use tracing::{debug, warn};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Session;

const ALL_SESSION_KEYS: [&str; 4] = [KEY_AUTH_TOKEN, KEY_USER_INFO, LEGACY_KEY_TOKEN, LEGACY_KEY_USER];

impl Database {
    /// Persist a session under the canonical keys.
    pub fn save_session(&self, session: &Session) -> Result<()> {
        let claims_json = serde_json::to_string(&session.claims).map_err(|e| StoreError::Json {
            key: KEY_USER_INFO.to_string(),
            source: e,
        })?;

        let tx = self.conn().unchecked_transaction()?;
        self.set_value(KEY_AUTH_TOKEN, &session.token)?;
        self.set_value(KEY_USER_INFO, &claims_json)?;
        self.remove_value(LEGACY_KEY_TOKEN)?;
        self.remove_value(LEGACY_KEY_USER)?;
        tx.commit()?;

        debug!(subject = ?session.claims.subject(), "session saved");
        Ok(())
    }

    /// Load the persisted session, if a token is stored.
    ///
    /// Claims are read from the key paired with the token's key
    /// (`userInfo` for `authToken`, `user` for `token`), so a leftover
    /// legacy identity never attaches to a canonical token. Claims that are
    /// missing or unreadable are re-derived from the token itself; a token
    /// whose claims cannot be decoded still yields a session with empty
    /// claims, since only the token decides whether a user is logged in.
    pub fn load_session(&self) -> Result<Option<Session>> {
        let (token, claims_key) = match self.get_value(KEY_AUTH_TOKEN)? {
            Some(token) => (token, KEY_USER_INFO),
            None => match self.get_value(LEGACY_KEY_TOKEN)? {
                Some(token) => (token, LEGACY_KEY_USER),
                None => return Ok(None),
            },
        };

        let stored = self.get_value(claims_key)?;
        let claims = match stored.map(|json| serde_json::from_str::<Claims>(&json)) {
            Some(Ok(claims)) => claims,
            Some(Err(e)) => {
                warn!(key = claims_key, error = %e, "stored claims are corrupt, decoding them from the token");
                decode_claims(&token).unwrap_or_default()
            }
            None => decode_claims(&token).unwrap_or_default(),
        };

        Ok(Some(Session { token, claims }))
    }

    /// Remove every session key, canonical and legacy.
    pub fn clear_session(&self) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;
        for key in ALL_SESSION_KEYS {
            self.remove_value(key)?;
        }
        tx.commit()?;

        debug!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azdocs_shared::token::encode_segment;
    use serde_json::json;

    fn sample_token() -> String {
        format!(
            "{}.{}.sig",
            encode_segment(&json!({"alg": "none"})),
            encode_segment(&json!({"sub": "u1", "name": "Grace"}))
        )
    }

    fn sample_session() -> Session {
        let token = sample_token();
        let claims = decode_claims(&token).unwrap();
        Session::new(token, claims)
    }

    #[test]
    fn save_load_clear() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_session().unwrap(), None);

        let session = sample_session();
        db.save_session(&session).unwrap();
        assert_eq!(db.load_session().unwrap(), Some(session));

        db.clear_session().unwrap();
        assert_eq!(db.load_session().unwrap(), None);
        assert_eq!(db.get_value(KEY_AUTH_TOKEN).unwrap(), None);
        assert_eq!(db.get_value(KEY_USER_INFO).unwrap(), None);
    }

    #[test]
    fn claims_without_token_is_logged_out() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(KEY_USER_INFO, r#"{"sub": "u1"}"#).unwrap();
        assert_eq!(db.load_session().unwrap(), None);
    }

    #[test]
    fn legacy_keys_are_read_and_cleared() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(LEGACY_KEY_TOKEN, "opaque").unwrap();
        db.set_value(LEGACY_KEY_USER, r#"{"name": "Old"}"#).unwrap();

        let session = db.load_session().unwrap().unwrap();
        assert_eq!(session.token, "opaque");
        assert_eq!(session.claims.name(), Some("Old"));

        db.clear_session().unwrap();
        assert!(db.list_entries().unwrap().is_empty());
    }

    #[test]
    fn canonical_token_ignores_legacy_claims() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(KEY_AUTH_TOKEN, &sample_token()).unwrap();
        db.set_value(LEGACY_KEY_USER, r#"{"name": "Old"}"#).unwrap();

        let session = db.load_session().unwrap().unwrap();
        assert_eq!(session.claims.name(), Some("Grace"));
    }

    #[test]
    fn legacy_token_ignores_canonical_claims() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(LEGACY_KEY_TOKEN, "opaque").unwrap();
        db.set_value(KEY_USER_INFO, r#"{"name": "Someone else"}"#).unwrap();

        let session = db.load_session().unwrap().unwrap();
        assert_eq!(session.token, "opaque");
        assert_eq!(session.claims.name(), None);
    }

    #[test]
    fn save_replaces_legacy_keys() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(LEGACY_KEY_TOKEN, "stale").unwrap();

        db.save_session(&sample_session()).unwrap();
        assert_eq!(db.get_value(LEGACY_KEY_TOKEN).unwrap(), None);
        assert_eq!(db.load_session().unwrap().unwrap().token, sample_token());
    }

    #[test]
    fn corrupt_claims_fall_back_to_token() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(KEY_AUTH_TOKEN, &sample_token()).unwrap();
        db.set_value(KEY_USER_INFO, "{not json").unwrap();

        let session = db.load_session().unwrap().unwrap();
        assert_eq!(session.claims.name(), Some("Grace"));
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = Database::open_in_dir(dir.path()).unwrap();
            db.save_session(&sample_session()).unwrap();
        }
        let db = Database::open_in_dir(dir.path()).unwrap();
        assert_eq!(db.load_session().unwrap(), Some(sample_session()));
    }
}
