use anyhow::Context;
use tracing::info;
use vault_secrets_plugin::{
    observability::{init_logging, log_config_info},
    startup, AppConfig, APP_NAME, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let config = AppConfig::from_env().context("invalid configuration")?;
    init_logging(&config.observability)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting Vault secrets plugin");
    log_config_info(&config);

    startup::run(config).await?;

    info!("Vault secrets plugin stopped");
    Ok(())
}
