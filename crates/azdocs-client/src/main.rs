use clap::Parser;

use azdocs_client::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    azdocs_client::init_tracing();
    azdocs_client::run(cli).await
}
