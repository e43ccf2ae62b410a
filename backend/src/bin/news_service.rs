//! News service: REST API, read-through cache and the confirmation consumer.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;

use sportnews::config::NewsServiceSettings;
use sportnews::domain::NewsService;
use sportnews::domain::ports::NewsCache;
use sportnews::inbound::events::{ConfirmationHandler, spawn_consumer};
use sportnews::inbound::http::health::HealthState;
use sportnews::outbound::bus::RedisEventBus;
use sportnews::outbound::cache::{DisabledNewsCache, RedisNewsCache};
use sportnews::outbound::persistence::{
    DbPool, DieselNewsRepository, MigrationSet, PoolConfig, run_migrations,
};
use sportnews::outbound::redis_pool::RedisPool;
use sportnews::server::{create_news_server, run_until_ctrl_c};
use sportnews::telemetry::init_tracing;

const REDIS_POOL_SIZE: u32 = 8;

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = NewsServiceSettings::load_from_iter(std::env::args_os())
        .map_err(|e| eyre!("failed to load news service settings: {e}"))?;
    let database_url = settings
        .database_url()
        .ok_or_else(|| eyre!("set NEWS_DATABASE_URL or DATABASE_URL"))?;

    run_migrations(&database_url, MigrationSet::News)
        .await
        .wrap_err("failed to migrate the news schema")?;
    let db_pool = DbPool::connect(PoolConfig::new(database_url))
        .await
        .wrap_err("failed to connect to PostgreSQL")?;
    let redis_pool = RedisPool::connect(settings.redis_url(), REDIS_POOL_SIZE)
        .await
        .wrap_err("failed to connect to Redis")?;

    let cache: Arc<dyn NewsCache> = if settings.cache_enabled() {
        Arc::new(RedisNewsCache::new(
            redis_pool.clone(),
            settings.cache_instance(),
        ))
    } else {
        info!("news cache disabled");
        Arc::new(DisabledNewsCache)
    };
    let bus = Arc::new(RedisEventBus::new(redis_pool));
    let service = NewsService::new(
        Arc::new(DieselNewsRepository::new(db_pool)),
        cache,
        bus.clone(),
    );

    let consumer = spawn_consumer(
        bus,
        Arc::new(ConfirmationHandler::new(service.clone())),
        CancellationToken::new(),
    );
    let health_state = web::Data::new(HealthState::new());
    let bind_addr = settings.bind_addr;
    let server = create_news_server(web::Data::new(service), health_state.clone(), bind_addr)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "news service listening");

    run_until_ctrl_c(server, health_state, Some(consumer))
        .await
        .wrap_err("news service failed")
}
