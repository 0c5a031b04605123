use anyhow::{bail, Context};
use serde_json::json;

use crate::cli::{open_store, OutputFormat};
use crate::config::AppConfig;
use crate::database::models::AccountSummary;
use crate::services::accounts;

pub async fn create(
    config: &AppConfig,
    username: &str,
    password: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    if config.database.url.is_none() {
        bail!("create-admin needs DATABASE_URL; the in-memory store would discard the account");
    }

    let store = open_store(config).await?;
    let account = accounts::ensure_admin(store.as_ref(), username, password)
        .await
        .with_context(|| format!("creating admin '{}'", username))?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "success": true, "account": AccountSummary::from(&account) })
        ),
        OutputFormat::Text => println!("Admin '{}' ready (id {})", account.username, account.id),
    }
    Ok(())
}
