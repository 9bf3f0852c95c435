//! API server entry point.
//!
//! Wires the production implementations (MySQL, Redis, disk storage, bcrypt,
//! JWT, AfroMessage) into the application state and starts the HTTP server.

use std::io;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use sd_api::app::{configure_routes, AppState};
use sd_api::middleware::cors::create_cors;
use sd_infra::cache::{RedisClient, RedisTokenStore};
use sd_infra::database::{DatabasePool, MySqlIdentityRepository};
use sd_infra::security::{BcryptPasswordHasher, JwtSessionIssuer};
use sd_infra::sms::AfroMessageClient;
use sd_infra::storage::DiskAttachmentStore;
use sd_shared::config::AppConfig;

type ProductionState = AppState<
    MySqlIdentityRepository,
    RedisTokenStore,
    DiskAttachmentStore,
    BcryptPasswordHasher,
    JwtSessionIssuer,
    AfroMessageClient,
>;

fn to_io_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    info!("Starting Sheger Dispatch API server");

    let pool = DatabasePool::new(config.database.clone())
        .await
        .map_err(to_io_error)?;
    let redis = RedisClient::new(config.cache.clone())
        .await
        .map_err(to_io_error)?;

    let identities = Arc::new(MySqlIdentityRepository::new(pool.get_pool().clone()));
    let tokens = Arc::new(RedisTokenStore::new(redis));
    let attachments = Arc::new(DiskAttachmentStore::new(config.storage.clone()));
    let hasher = Arc::new(BcryptPasswordHasher::default());
    let sessions = Arc::new(JwtSessionIssuer::new(config.auth.clone()));
    let provider = Arc::new(AfroMessageClient::from_env().map_err(to_io_error)?);

    let state: web::Data<ProductionState> = web::Data::new(AppState::new(
        identities,
        tokens,
        attachments,
        hasher,
        sessions,
        provider,
    ));

    let bind_address = config.server.bind_address();
    info!("Server binding to {}", bind_address);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .wrap(create_cors())
            .configure(
                configure_routes::<
                    MySqlIdentityRepository,
                    RedisTokenStore,
                    DiskAttachmentStore,
                    BcryptPasswordHasher,
                    JwtSessionIssuer,
                    AfroMessageClient,
                >,
            )
    });
    if let Some(workers) = config.server.worker_count() {
        server = server.workers(workers);
    }
    server.bind(&bind_address)?.run().await
}
