use clap::Parser;
use tracing_subscriber::EnvFilter;

use tutorhub::cli::{self, Cli};
use tutorhub::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET etc. can live there
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tutorhub=info,tower_http=info")),
        )
        .init();

    let config = config::config().clone();
    config.validate()?;
    tracing::info!("Starting tutorhub ({:?} environment)", config.environment);

    cli::run(Cli::parse(), config).await
}
