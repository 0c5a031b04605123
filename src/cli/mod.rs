pub mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(name = "tutorhub")]
#[command(about = "Tutoring marketplace API server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Create the database tables if they are missing")]
    InitDb,

    #[command(about = "Create an administrator account")]
    CreateAdmin {
        #[arg(long, help = "Login name of the new administrator")]
        username: String,
        #[arg(long, help = "Password (at least 8 characters)")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(config).await,
        Commands::InitDb => commands::database::init(&config, output_format).await,
        Commands::CreateAdmin { username, password } => {
            commands::admin::create(&config, &username, &password, output_format).await
        }
    }
}

/// Postgres when `DATABASE_URL` is configured, otherwise a process-local
/// store that forgets everything on exit.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL not set; using the in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("connecting to the database")?;
    if config.database.bootstrap_schema {
        DatabaseManager::bootstrap_schema(&pool)
            .await
            .context("creating database tables")?;
    }
    Ok(Arc::new(PgStore::new(pool)))
}
