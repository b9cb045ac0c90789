use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::{PgTokenDenylist, TokenDenylist};
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::state::AppState;

pub async fn handle(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.api.host = host;
    }
    if let Some(port) = port {
        config.api.port = port;
    }

    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    if config.database.run_migrations {
        db.migrate().await?;
    }

    let denylist: Arc<dyn TokenDenylist> = Arc::new(PgTokenDenylist::new(db.pool().clone()));
    let purge = spawn_purge_task(
        denylist.clone(),
        Duration::from_secs(config.security.denylist_purge_interval_secs),
    );

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!(
        "Chatbot Management API ({:?}) listening on http://{}",
        config.environment,
        listener.local_addr()?
    );

    let state = AppState::new(config, db.clone(), denylist);
    axum::serve(listener, crate::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    purge.abort();
    db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Periodically drop denylist entries whose tokens have expired.
fn spawn_purge_task(denylist: Arc<dyn TokenDenylist>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            match denylist.purge_expired().await {
                Ok(0) => tracing::debug!("No expired denylist entries"),
                Ok(n) => info!("Purged {} expired denylist entries", n),
                Err(e) => tracing::error!(error = %e, "Denylist purge failed"),
            }
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    info!("Shutdown signal received");
}
