//! HTTP Server
//!
//! リスナーの起動と終了シグナルの待ち受け

use anyhow::{Context, Result};
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use crate::adapter::config::ServerConfig;

use super::app::AppState;
use super::http::{cors_layer, router};

/// APIサーバーを起動し、Ctrl+CかSIGTERMで停止する
///
/// # Errors
///
/// アドレスにバインドできない場合
pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> Result<()> {
    let app = router(state).layer(cors_layer(&config.allowed_origins));

    let address = format!("{}:{}", config.host, config.port);
    info!("Binding to {}", address);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
