use anyhow::Context;
use navien_server::{logging, AppState, ServerConfig, SqliteStorage};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let config = ServerConfig::from_env().context("loading configuration")?;
    let storage = SqliteStorage::connect(&config.database_url, config.table.clone())
        .await
        .context("opening storage")?;

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on {addr}");

    navien_server::run(listener, AppState::new(storage, &config)).await?;
    Ok(())
}
