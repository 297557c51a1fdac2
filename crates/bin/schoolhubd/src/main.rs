use schoolhub_adapter_storage_sqlite_sqlx::Config as DatabaseConfig;
use schoolhub_adapter_webhook_reqwest::Config as WebhookConfig;
use schoolhubd::config::Config;
use schoolhubd::wiring::Services;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;

    let webhooks = WebhookConfig {
        timeout: config.webhook.timeout(),
        user_agent: config.webhook.user_agent.clone(),
    }
    .build()?;

    let services = Services::new(db.pool(), webhooks);

    if config.scheduler.enabled {
        tracing::info!("schoolhubd running with scheduler");
        services.scheduler.run(shutdown_signal()).await;
    } else {
        tracing::info!("schoolhubd running without scheduler");
        shutdown_signal().await;
    }

    db.pool().close().await;
    tracing::info!("schoolhubd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
