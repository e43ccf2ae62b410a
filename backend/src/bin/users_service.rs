//! Users service: REST API and the news registration consumer.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;

use sportnews::config::UsersServiceSettings;
use sportnews::domain::UserService;
use sportnews::inbound::events::{RegistrationHandler, spawn_consumer};
use sportnews::inbound::http::health::HealthState;
use sportnews::outbound::bus::RedisEventBus;
use sportnews::outbound::persistence::{
    DbPool, DieselUserRepository, MigrationSet, PoolConfig, run_migrations,
};
use sportnews::outbound::redis_pool::RedisPool;
use sportnews::server::{create_users_server, run_until_ctrl_c};
use sportnews::telemetry::init_tracing;

const REDIS_POOL_SIZE: u32 = 4;

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = UsersServiceSettings::load_from_iter(std::env::args_os())
        .map_err(|e| eyre!("failed to load users service settings: {e}"))?;
    let database_url = settings
        .database_url()
        .ok_or_else(|| eyre!("set USERS_DATABASE_URL or DATABASE_URL"))?;

    run_migrations(&database_url, MigrationSet::Users)
        .await
        .wrap_err("failed to migrate the users schema")?;
    let db_pool = DbPool::connect(PoolConfig::new(database_url))
        .await
        .wrap_err("failed to connect to PostgreSQL")?;
    let redis_pool = RedisPool::connect(settings.redis_url(), REDIS_POOL_SIZE)
        .await
        .wrap_err("failed to connect to Redis")?;

    let bus = Arc::new(RedisEventBus::new(redis_pool));
    let service = UserService::new(
        Arc::new(DieselUserRepository::new(db_pool)),
        bus.clone(),
        Arc::new(DefaultClock),
    );

    let consumer = spawn_consumer(
        bus,
        Arc::new(RegistrationHandler::new(service.clone())),
        CancellationToken::new(),
    );
    let health_state = web::Data::new(HealthState::new());
    let bind_addr = settings.bind_addr;
    let server = create_users_server(web::Data::new(service), health_state.clone(), bind_addr)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "users service listening");

    run_until_ctrl_c(server, health_state, Some(consumer))
        .await
        .wrap_err("users service failed")
}
