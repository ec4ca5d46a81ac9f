use tracing::info;
use tracing_subscriber::EnvFilter;

use azdocs_server::{serve, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,azdocs_server=debug")),
        )
        .init();

    info!("Starting AzDocs dev server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(
        addr = %config.http_addr,
        uploads = %config.upload_storage_path.display(),
        callback = %config.frontend_callback_url,
        dev_user = %config.dev_user_id,
        "Loaded configuration"
    );
    let http_addr = config.http_addr;

    // -----------------------------------------------------------------------
    // 3. Initialize state (creates the upload directory if missing)
    // -----------------------------------------------------------------------
    let app_state = AppState::new(config).await?;

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server until it fails or Ctrl+C arrives
    // -----------------------------------------------------------------------
    tokio::select! {
        result = serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
