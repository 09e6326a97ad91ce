use std::sync::Arc;

use anyhow::Result;
use secrecy::ExposeSecret;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use timetrack_api::{
  config::AppConfig,
  store::{RecordStore, SqliteBackend},
  AppState,
};
use timetrack_assistant::{analytics::HttpAnalytics, remote::RemoteModel, Assistant};

const MAX_DB_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();

  let log_level = std::env::var("TIMETRACK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
  let env_filter = EnvFilter::from_default_env().add_directive(log_level.parse()?);

  // Initialize tracing subscriber with the environment filter
  tracing_subscriber::fmt().with_env_filter(env_filter).init();

  let config = AppConfig::from_env()?;

  let cancel_token = CancellationToken::new();

  // Start task for catching interrupt
  tokio::spawn({
    let cancel_token = cancel_token.clone();
    async move {
      let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
          error!("Failed to install Ctrl+C handler: {}", err);
          std::future::pending::<()>().await;
        }
      };

      #[cfg(unix)]
      let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
          Ok(mut stream) => {
            stream.recv().await;
          },
          Err(err) => {
            error!("Failed to install signal handler: {}", err);
            std::future::pending::<()>().await;
          },
        }
      };

      #[cfg(not(unix))]
      let terminate = std::future::pending::<()>();

      tokio::select! {
        _ = ctrl_c => {
          info!("Received Ctrl-C, shutting down...");
          cancel_token.cancel()
        },
        _ = terminate => {
          info!("Received terminate, shutting down...");
          cancel_token.cancel()
        },
      }
    }
  });

  let backend = Arc::new(SqliteBackend::connect(&config.database_url, MAX_DB_CONNECTIONS).await?);
  let store = RecordStore::new(backend.clone());

  let server_url = config.server_url();
  let remote = config.model.map(|model| {
    info!("Assistant answers through remote model at {}", model.url);
    RemoteModel::new(&model.url, model.api_key, model.model)
  });
  let assistant = Assistant::new(Arc::new(HttpAnalytics::new(&config.analytics_url)), remote);

  let state = AppState::new(
    store,
    assistant,
    config.jwt_secret.expose_secret().as_bytes(),
    config.jwt_maxage_minutes,
  );

  if let Err(err) = timetrack_api::run(state, &server_url, &config.cors_origin, cancel_token).await {
    error!("Api server stopped with error: {:?}", err);
  }

  backend.close().await;

  Ok(())
}
