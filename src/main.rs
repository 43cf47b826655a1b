use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use inpost_gateway::config::Config;
use inpost_gateway::error::AppError;
use inpost_gateway::shipx::ShipxClient;
use inpost_gateway::state::AppState;
use inpost_gateway::api;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let shipx = ShipxClient::new(&config)?;
    let state = Arc::new(AppState::new(shipx));
    let app = api::rest::router(state);

    if let Some(webhook_url) = &config.webhook_url {
        tracing::info!(%webhook_url, "expecting InPost status callbacks");
    }

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        environment = ?config.environment,
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
