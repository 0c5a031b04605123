use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn init(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("init-db needs DATABASE_URL")?;
    DatabaseManager::bootstrap_schema(&pool).await?;
    DatabaseManager::health_check(&pool).await?;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "success": true, "schema": "ready" })),
        OutputFormat::Text => println!("Database schema ready"),
    }
    Ok(())
}
