use anyhow::Context;
use clap::Parser;

use snippetbox::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cli.load_config().context("failed to load configuration")?;
    init_tracing(&config.log).context("failed to initialize tracing")?;

    if let Err(e) = run(config).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        storage = %store::sanitize_url(&config.database.url),
        "Starting snippetbox on {}",
        config.server.addr
    );

    let snippets = store::connect(&config.database)
        .await
        .context("failed to open snippet storage")?;
    snippets
        .migrate()
        .await
        .context("failed to prepare snippet schema")?;

    let app = router(AppState::new(snippets.clone()));
    let served = Server::new(config.server).serve(app).await;

    snippets.close().await;
    tracing::info!("Storage closed");

    served.context("server error")
}
