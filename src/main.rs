use std::sync::Arc;

use anyhow::Context;
use socialid::{auth, db, AppState, Config};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("socialid=info,tower_http=info")),
        )
        .init();

    let config = Config::load()?;

    let db_pool = db::open(&config.database_url, config.database_max_connections)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;

    let clients = match std::fs::read_to_string(&config.client_secret_path) {
        Ok(raw) => auth::Clients::from_json(serde_json::from_str(&raw)?, &config.public_url)
            .map_err(|err| anyhow::anyhow!("{}: {err}", config.client_secret_path))?,
        Err(err) => {
            tracing::warn!("{}: {err}; sign-in is disabled", config.client_secret_path);
            auth::Clients::default()
        }
    };
    if config.admin_emails.is_empty() {
        tracing::warn!("ADMIN_EMAILS is empty; admin endpoints will refuse everyone");
    }

    let bind_address = config.bind_address.clone();
    let app = socialid::app(AppState {
        db_pool,
        clients,
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                tracing::error!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
