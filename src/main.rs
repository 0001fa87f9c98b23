//! Lodging Bookings server

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lodging_bookings::{
    api,
    config::{AppConfig, SessionBackend, StoreBackend},
    repository::{BookingRepository, MemoryRepository, PgRepository},
    services::{
        email::{drain_mail_worker, spawn_mail_worker, MailQueue, SmtpMailer},
        users::hash_password,
        Services,
    },
    session::{MemorySessionStore, RedisSessionStore, SessionStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config);

    tracing::info!("Starting Lodging Bookings v{}", env!("CARGO_PKG_VERSION"));

    let store = connect_store(&config).await?;
    seed_admin(&config, store.as_ref()).await?;
    let sessions = connect_sessions(&config).await?;

    // Outbound mail: one queue, one worker
    let (mail_queue, mail_receiver) = MailQueue::channel(config.email.queue_capacity);
    let mail_worker = spawn_mail_worker(
        mail_receiver,
        Arc::new(SmtpMailer::new(config.email.clone())),
    );

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );
    let drain_timeout = config.email.drain_timeout();

    let services = Services::new(store, mail_queue, config.email.clone());
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        sessions,
    };

    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and every MailQueue clone it held) is gone: the worker ends once the queue is empty
    tracing::info!("Server stopped, draining mail queue");
    drain_mail_worker(mail_worker, drain_timeout).await;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("lodging_bookings={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn BookingRepository>> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(config.database.query_timeout())
                .connect(&config.database.url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            tracing::info!("Database migrations completed");

            Ok(Arc::new(PgRepository::new(pool, config.database.query_timeout())))
        }
        StoreBackend::Memory => {
            if config.in_production {
                anyhow::bail!("The in-memory store cannot be used in production");
            }
            tracing::warn!("Using the in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryRepository::seeded()))
        }
    }
}

/// Create the configured back-office account, if any
async fn seed_admin(config: &AppConfig, store: &dyn BookingRepository) -> anyhow::Result<()> {
    if let (Some(email), Some(password)) = (
        &config.database.seed_admin_email,
        &config.database.seed_admin_password,
    ) {
        let id = store.upsert_user(email, &hash_password(password)?).await?;
        tracing::info!(user_id = id, email = %email, "Seeded back-office user");
    }
    Ok(())
}

async fn connect_sessions(config: &AppConfig) -> anyhow::Result<Arc<dyn SessionStore>> {
    let lifetime = config.session.lifetime();
    match config.session.backend {
        SessionBackend::Redis => {
            let store = RedisSessionStore::new(&config.session.redis_url, lifetime)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Connected to Redis");
            Ok(Arc::new(store))
        }
        SessionBackend::Memory => Ok(Arc::new(MemorySessionStore::new(lifetime))),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
