//! Binary entrypoint for the incident API.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use incident_api::{AppState, Config, SqliteGateway};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = Config::from_env()?;
  let gateway = Arc::new(SqliteGateway::open(&config).await?);
  let state = Arc::new(AppState::new(gateway.clone()));
  let app = incident_api::app(state);

  let addr = config.bind_addr();
  let listener = tokio::net::TcpListener::bind(addr).await?;
  info!("incident-api listening on http://{}", addr);

  let served = axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await;

  gateway.close().await;
  served?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("failed to listen for shutdown signal: {}", e);
    // Without a signal handler, run until the listener fails.
    std::future::pending::<()>().await;
  }
  info!("shutdown requested");
}
