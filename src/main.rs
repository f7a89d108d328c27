use std::{process, sync::Arc};
use store_ratings::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    db::Database,
    repository::{PostgresRepository, RepositoryState},
};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initialises logging, builds the lazy database pool and
/// serves HTTP until Ctrl-C or SIGTERM, then drains the pool.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "store_ratings=debug,tower_http=info,axum=trace".into());

    // The log format depends on APP_ENV, which is read before the rest of the
    // configuration so that configuration errors are logged in the right format.
    match Env::from_env() {
        Env::Production => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        Env::Local => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init(),
    }

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            process::exit(1);
        }
    };

    tracing::info!("Application starting in {:?} mode", config.env);
    if config.env == Env::Local && config.db_ssl_mode.is_none() {
        tracing::debug!("DATABASE_SSL_MODE not set, using the sslmode from DATABASE_URL");
    }

    // No connection is opened here; the first query connects.
    let db = match Database::connect_lazy(&config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "cannot build database pool");
            process::exit(1);
        }
    };

    let repo = Arc::new(PostgresRepository::new(db.clone())) as RepositoryState;
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(repo, &config));

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %bind_addr, "cannot bind listener");
            process::exit(1);
        }
    };

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("Draining database pool");
    db.close().await;
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
