use anyhow::{Context, Result};
use catalog_relay::{RegistrationConfig, config, init_tracing, register};

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = config::load_dotenv();
    init_tracing();
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    let config = RegistrationConfig::from_env().context("Failed to read registration details")?;

    // Any transport failure ends the process with a non-zero status.
    let status = register::submit(&reqwest::Client::new(), &config.url, &config.payload)
        .await
        .with_context(|| format!("Failed to register at {}", config.url))?;

    tracing::info!("Response Status: {}", status);
    Ok(())
}
