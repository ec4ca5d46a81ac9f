//! Application state handed to every command.

use azdocs_store::Result;

use crate::api::ApiClient;
use crate::auth;
use crate::config::ClientConfig;
use crate::routing::{guard, Route};
use crate::session::SessionContext;

/// Configuration, session and the API client built from them. The API
/// client's bearer token follows the session through
/// [`callback`](Self::callback) and [`logout`](Self::logout).
pub struct AppState {
    pub config: ClientConfig,
    pub session: SessionContext,
    pub api: ApiClient,
}

impl AppState {
    pub fn new(config: ClientConfig, session: SessionContext) -> Self {
        let api = ApiClient::new(config.api_url.clone())
            .with_token(session.token().map(str::to_string));
        Self {
            config,
            session,
            api,
        }
    }

    /// Open the configured session database and build the state around it.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let session = SessionContext::open(&config)?;
        Ok(Self::new(config, session))
    }

    /// Where a request for `route` actually lands.
    pub fn resolve(&self, route: Route) -> Route {
        guard(route, &self.session)
    }

    pub fn callback(&mut self, input: &str) -> Result<Route> {
        let route = auth::handle_callback(input, &mut self.session)?;
        self.sync_token();
        Ok(route)
    }

    pub fn logout(&mut self) -> Result<Route> {
        let route = auth::logout(&mut self.session)?;
        self.sync_token();
        Ok(route)
    }

    fn sync_token(&mut self) {
        self.api.set_token(self.session.token().map(str::to_string));
    }
}
