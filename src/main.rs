use anyhow::{Context, Result};
use catalog_relay::{ServiceConfig, UpstreamClient, config, init_tracing, router};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = config::load_dotenv();
    init_tracing();
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    let config = ServiceConfig::from_env().context("Failed to read service configuration")?;
    let client = UpstreamClient::from_config(&config.upstream)
        .context("Failed to build upstream client")?;
    tracing::info!(upstream = client.base_url(), "relaying to upstream");

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "catalog relay listening");

    axum::serve(listener, router(client))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
