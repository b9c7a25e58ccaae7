//! Live tournament scoring server.
//!
//! Serves the REST API and realtime WebSocket rooms on top of either a
//! PostgreSQL or an in-memory store.

use std::sync::Arc;

use anyhow::{Context, Error};
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use scorekeeper::db::{Database, MemoryStore, PgStore, Store};
use sk_server::{
    api,
    config::{CliOverrides, ServerConfig, StorageBackend},
    logging, metrics,
};
use tokio::sync::watch;

const HELP: &str = "\
Run a live tournament scoring server

USAGE:
  sk_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --hash-password PASSWORD Print an ADMIN_PASSWORD_HASH value for PASSWORD and exit

FLAGS:
  --memory                 Keep everything in memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  STORAGE                  Set to 'memory' for the in-memory store
  ADMIN_PASSWORD_HASH      Argon2 PHC string of the admin password (required)
  MATCH_ACTOR_IDLE_SECS    Stop idle match actors after N seconds [default: 300]
  MATCH_ACTOR_INBOX        Pending commands per match actor [default: 64]
  METRICS_BIND             Prometheus listener address (optional)
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    if let Some(password) = pargs.opt_value_from_str::<_, String>("--hash-password")? {
        let hash = api::middleware::hash_password(&password).map_err(anyhow::Error::msg)?;
        println!("{hash}");
        return Ok(());
    }

    let overrides = CliOverrides {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        memory: pargs.contains("--memory"),
    };

    logging::init();

    let config = ServerConfig::from_env(overrides)?;

    // Catching signals for a graceful exit.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics on http://{}/metrics", addr);
    }

    let (store, database): (Arc<dyn Store>, Option<Database>) = match config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory storage; nothing survives a restart");
            (Arc::new(MemoryStore::new()), None)
        }
        StorageBackend::Postgres => {
            let db = Database::new(&config.database)
                .await
                .context("Failed to connect to database")?;
            db.migrate().await.context("Failed to run migrations")?;
            info!("Database connected and migrated");
            (Arc::new(PgStore::new(db.pool().clone())), Some(db))
        }
    };

    let state = api::AppState::new(
        store,
        config.admin_password_hash.clone(),
        config.actors,
        database.clone(),
    );

    // Forget stopped match actors once per idle period
    let manager = state.matches.clone();
    let idle = config.actors.idle_timeout;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(idle);
        loop {
            ticker.tick().await;
            let pruned = manager.prune().await;
            if pruned > 0 {
                log::debug!("Pruned {} stopped match actors", pruned);
            }
            metrics::active_match_actors(manager.active_actors().await);
        }
    });

    let app = api::create_router(state);

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Resolves once the signal handler fires
async fn shutdown_signal(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            break;
        }
    }
}
