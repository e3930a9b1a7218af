use std::sync::Arc;

use anyhow::Context;
use linkshrink::{config::AppConfig, snapshot, AppState, LinkStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkshrink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting LinkShrink on {}", config.bind_addr());
    tracing::info!("Base URL: {}", config.base_url);

    let store = LinkStore::with_generator(
        linkshrink::code::RandomCodeGenerator,
        config.max_code_attempts,
    );

    if let Some(path) = &config.data_file {
        let count = snapshot::load(&store, path)
            .await
            .with_context(|| format!("failed to load links from {}", path.display()))?;
        tracing::info!("Loaded {} link(s) from {}", count, path.display());
    }

    let bind_addr = config.bind_addr();
    let state = Arc::new(AppState { store, config });
    let app = linkshrink::router(state.clone());

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(path) = &state.config.data_file {
        snapshot::save(&state.store, path)
            .await
            .with_context(|| format!("failed to save links to {}", path.display()))?;
    }

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {:?}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
