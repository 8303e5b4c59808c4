use quiz_server::config::Config;
use quiz_server::repositories::MIGRATOR;
use quiz_server::sweeper::start_invitation_sweeper;
use quiz_server::{AppState, create_router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Inizializza la configurazione
    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    config.print_info();

    // Pool SQLite: file creato se manca, vincoli di chiave esterna attivi
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
        .connect_with(connect_options)
        .await?;

    MIGRATOR.run(&pool).await?;
    info!("Database migrations applied");

    let state = Arc::new(AppState::new(pool, config.jwt_secret.clone()));

    start_invitation_sweeper(state.clone(), config.invitation_sweep_secs);

    let app = create_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Attende Ctrl+C per lo spegnimento ordinato
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
