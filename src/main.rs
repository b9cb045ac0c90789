use clap::Parser;
use tracing_subscriber::EnvFilter;

use chatbot_management_api::cli::{self, Cli};
use chatbot_management_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. are picked up
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Chatbot Management API in {:?} mode", config.environment);
    cli::run(cli, config).await
}
