use std::sync::Arc;

use anyhow::{Context, Result};
use forageguide::config::LoggingConfig;
use forageguide::{ForageConfig, ForageService, web};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ForageConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    info!("ForageGuide {} starting", forageguide::VERSION);

    let service = ForageService::from_config(&config).context("failed to build service")?;
    web::run(&config.server, Arc::new(service)).await
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}
