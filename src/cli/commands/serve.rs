use anyhow::Context;
use tokio::net::TcpListener;

use crate::app::app;
use crate::cli::open_store;
use crate::config::AppConfig;
use crate::services::accounts;
use crate::state::AppState;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let store = open_store(&config).await?;

    if let Some(admin) = &config.security.bootstrap_admin {
        accounts::ensure_admin(store.as_ref(), &admin.username, &admin.password)
            .await
            .context("seeding the bootstrap admin")?;
    }

    let address = config.bind_address();
    let state = AppState::new(store, config);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {}", address))?;

    tracing::info!("tutorhub listening on http://{}", address);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
