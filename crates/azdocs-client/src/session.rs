//! The signed-in user's session, passed explicitly to whatever needs it.

use azdocs_shared::token::Claims;
use azdocs_store::{Database, Result, Session};
use tracing::info;

use crate::config::ClientConfig;

/// Owns the session database and a cached copy of the stored session.
///
/// The cache is only changed through [`establish`](Self::establish) and
/// [`clear`](Self::clear), which write through to the database first.
pub struct SessionContext {
    db: Database,
    session: Option<Session>,
}

impl SessionContext {
    /// Open the session database named by the configuration.
    pub fn open(config: &ClientConfig) -> Result<Self> {
        let db = match &config.data_dir {
            Some(dir) => Database::open_in_dir(dir)?,
            None => Database::new()?,
        };
        Self::from_database(db)
    }

    /// A session that lives only as long as the value.
    pub fn in_memory() -> Result<Self> {
        Self::from_database(Database::open_in_memory()?)
    }

    pub fn from_database(db: Database) -> Result<Self> {
        let session = db.load_session()?;
        Ok(Self { db, session })
    }

    /// Token presence is the whole check; expiry is the backend's business.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.session.as_ref().map(|s| &s.claims)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn establish(&mut self, session: Session) -> Result<()> {
        self.db.save_session(&session)?;
        info!(subject = ?session.claims.subject(), "signed in");
        self.session = Some(session);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.db.clear_session()?;
        if self.session.take().is_some() {
            info!("signed out");
        }
        Ok(())
    }

    /// Re-read the stored session, picking up changes made by another
    /// process sharing the database.
    pub fn reload(&mut self) -> Result<()> {
        self.session = self.db.load_session()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azdocs_shared::constants::KEY_AUTH_TOKEN;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new("h.p.s", Claims::default())
    }

    #[test]
    fn establish_and_clear() {
        let mut ctx = SessionContext::in_memory().unwrap();
        assert!(!ctx.is_authenticated());

        ctx.establish(session()).unwrap();
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.token(), Some("h.p.s"));

        ctx.clear().unwrap();
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.database().get_value(KEY_AUTH_TOKEN).unwrap(), None);
    }

    #[test]
    fn session_persists_in_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..ClientConfig::defaults().unwrap()
        };

        SessionContext::open(&config)
            .unwrap()
            .establish(session())
            .unwrap();

        let reopened = SessionContext::open(&config).unwrap();
        assert_eq!(reopened.token(), Some("h.p.s"));
    }

    #[test]
    fn reload_sees_external_changes() {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..ClientConfig::defaults().unwrap()
        };

        let mut first = SessionContext::open(&config).unwrap();
        let mut second = SessionContext::open(&config).unwrap();
        first.establish(session()).unwrap();
        assert!(!second.is_authenticated());

        second.reload().unwrap();
        assert!(second.is_authenticated());
    }
}
