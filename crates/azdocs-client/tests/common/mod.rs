#![allow(dead_code)]

use azdocs_client::{ApiClient, SessionContext};
use azdocs_server::{serve_on, AppState, ServerConfig};
use reqwest::Url;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A dev server running on an ephemeral port for the duration of a test.
pub struct Backend {
    pub url: Url,
    pub state: AppState,
    _uploads: TempDir,
}

impl Backend {
    pub async fn start() -> Self {
        let uploads = TempDir::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let config = ServerConfig {
            http_addr: addr,
            upload_storage_path: uploads.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let state = AppState::new(config).await.unwrap();
        tokio::spawn(serve_on(state.clone(), listener));

        Self {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            state,
            _uploads: uploads,
        }
    }

    /// Client signed in as the dev user.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.url.clone()).with_token(Some(self.state.dev_token()))
    }

    pub fn anonymous_client(&self) -> ApiClient {
        ApiClient::new(self.url.clone())
    }
}

/// Origin on which nothing listens.
pub async fn unreachable_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}

pub fn session() -> SessionContext {
    SessionContext::in_memory().unwrap()
}
