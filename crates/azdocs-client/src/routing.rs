//! Path-to-view mapping and the authentication guard.

use std::fmt;

use azdocs_shared::types::ConversationId;

use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    AuthCallback,
    /// Chat view, optionally opened on a conversation.
    Chat(Option<ConversationId>),
    Upload,
    /// Placeholder page with no behaviour.
    ForgotPassword,
}

impl Route {
    /// Map a path (query and fragment ignored) to a route. Unknown paths,
    /// including `/`, land on the login view.
    pub fn parse(path: &str) -> Route {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Route::Login,
            ["auth", "callback"] => Route::AuthCallback,
            ["chat"] => Route::Chat(None),
            ["chat", id] => Route::Chat(Some(ConversationId::new(*id))),
            ["upload"] => Route::Upload,
            ["forgot-password"] => Route::ForgotPassword,
            _ => Route::Login,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::AuthCallback => "/auth/callback".to_string(),
            Route::Chat(None) => "/chat".to_string(),
            Route::Chat(Some(id)) => format!("/chat/{id}"),
            Route::Upload => "/upload".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Chat(_) | Route::Upload)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Resolve the route a visitor actually ends up on: protected routes
/// without a stored token redirect to login.
pub fn guard(route: Route, session: &SessionContext) -> Route {
    if route.is_protected() && !session.is_authenticated() {
        tracing::debug!(requested = %route, "not signed in, redirecting to login");
        return Route::Login;
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use azdocs_shared::token::Claims;
    use azdocs_store::Session;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Route::Login);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/auth/callback?token=x"), Route::AuthCallback);
        assert_eq!(Route::parse("/chat/"), Route::Chat(None));
        assert_eq!(
            Route::parse("/chat/1712.5"),
            Route::Chat(Some(ConversationId::new("1712.5")))
        );
        assert_eq!(Route::parse("/upload"), Route::Upload);
        assert_eq!(Route::parse("/forgot-password"), Route::ForgotPassword);
        assert_eq!(Route::parse("/admin/secret"), Route::Login);
    }

    #[test]
    fn path_round_trips() {
        for route in [
            Route::Login,
            Route::AuthCallback,
            Route::Chat(None),
            Route::Chat(Some(ConversationId::new("42"))),
            Route::Upload,
            Route::ForgotPassword,
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn guard_redirects_only_protected_routes() {
        let mut session = SessionContext::in_memory().unwrap();

        assert_eq!(guard(Route::Chat(None), &session), Route::Login);
        assert_eq!(guard(Route::Upload, &session), Route::Login);
        assert_eq!(guard(Route::ForgotPassword, &session), Route::ForgotPassword);
        assert_eq!(guard(Route::AuthCallback, &session), Route::AuthCallback);

        session
            .establish(Session::new("a.b.c", Claims::default()))
            .unwrap();
        assert_eq!(guard(Route::Upload, &session), Route::Upload);
    }
}
