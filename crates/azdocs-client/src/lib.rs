//! # azdocs-client
//!
//! Terminal client for the AzDocs documentation assistant.
//!
//! - **Session**: the bearer token and identity claims, persisted through
//!   `azdocs-store` and passed around as a [`SessionContext`]
//! - **Routing**: maps view paths to [`Route`]s and sends visitors without
//!   a token to login
//! - **Views**: the chat transcript, the conversation list and the upload
//!   session, each a small state machine over the [`ApiClient`]
//! - **CLI**: the `azdocs` binary drives the views from the command line

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod routing;
pub mod session;
pub mod state;
pub mod views;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use routing::Route;
pub use session::SessionContext;
pub use state::AppState;

use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Cli;

/// Install the global tracing subscriber. Logs go to stderr so command
/// output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("azdocs_client=info,azdocs_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Resolve configuration, open the session and run one command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?.with_overrides(cli.api_url.as_deref(), cli.data_dir)?;
    tracing::debug!(api_url = %config.api_url, data_dir = ?config.data_dir, "configuration resolved");

    let mut state = AppState::open(config)?;
    commands::dispatch(&mut state, cli.command).await
}
