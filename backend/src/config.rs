//! Process settings loaded via OrthoConfig.
//!
//! Each binary has its own settings struct and environment prefix, so the
//! three processes can share one environment without clashing. Unset values
//! fall back to the local development defaults below.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Environment variable consulted when a service has no database URL of its
/// own.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_CACHE_INSTANCE: &str = "RedisCacheInstance";
const DEFAULT_NEWS_PORT: u16 = 5001;
const DEFAULT_USERS_PORT: u16 = 5002;
const DEFAULT_GATEWAY_PORT: u16 = 8080;
const DEFAULT_NEWS_UPSTREAM: &str = "http://127.0.0.1:5001";
const DEFAULT_USERS_UPSTREAM: &str = "http://127.0.0.1:5002";

const fn any_interface(port: u16) -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))
}

fn database_url_or_env(configured: Option<&String>) -> Option<String> {
    configured
        .cloned()
        .or_else(|| std::env::var(DATABASE_URL_ENV).ok())
        .filter(|url| !url.trim().is_empty())
}

/// Settings for the `news-service` binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NEWS")]
pub struct NewsServiceSettings {
    /// Listening address.
    #[ortho_config(default = any_interface(DEFAULT_NEWS_PORT))]
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string for the `news` table.
    pub database_url: Option<String>,
    /// Redis connection string used by the cache and the event bus.
    pub redis_url: Option<String>,
    /// Serve reads from the Redis cache. Unset means enabled.
    pub cache_enabled: Option<bool>,
    /// Prefix prepended to every cache key.
    pub cache_instance: Option<String>,
}

impl NewsServiceSettings {
    /// Whether reads go through the cache, `true` unless switched off.
    #[must_use]
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled.unwrap_or(true)
    }

    /// Configured database URL, else `DATABASE_URL`.
    #[must_use]
    pub fn database_url(&self) -> Option<String> {
        database_url_or_env(self.database_url.as_ref())
    }

    /// Redis URL, local Redis by default.
    #[must_use]
    pub fn redis_url(&self) -> &str {
        self.redis_url.as_deref().unwrap_or(DEFAULT_REDIS_URL)
    }

    /// Cache key prefix.
    #[must_use]
    pub fn cache_instance(&self) -> &str {
        self.cache_instance
            .as_deref()
            .unwrap_or(DEFAULT_CACHE_INSTANCE)
    }
}

/// Settings for the `users-service` binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS")]
pub struct UsersServiceSettings {
    /// Listening address.
    #[ortho_config(default = any_interface(DEFAULT_USERS_PORT))]
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string for the `users` table.
    pub database_url: Option<String>,
    /// Redis connection string used by the event bus.
    pub redis_url: Option<String>,
}

impl UsersServiceSettings {
    /// Configured database URL, else `DATABASE_URL`.
    #[must_use]
    pub fn database_url(&self) -> Option<String> {
        database_url_or_env(self.database_url.as_ref())
    }

    /// Redis URL, local Redis by default.
    #[must_use]
    pub fn redis_url(&self) -> &str {
        self.redis_url.as_deref().unwrap_or(DEFAULT_REDIS_URL)
    }
}

/// Settings for the `gateway` binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GATEWAY")]
pub struct GatewaySettings {
    /// Listening address.
    #[ortho_config(default = any_interface(DEFAULT_GATEWAY_PORT))]
    pub bind_addr: SocketAddr,
    /// JSON route table replacing the built-in routes.
    pub routes_file: Option<PathBuf>,
    /// Base URL of the news service.
    pub news_upstream: Option<String>,
    /// Base URL of the users service.
    pub users_upstream: Option<String>,
}

impl GatewaySettings {
    /// News service base URL.
    #[must_use]
    pub fn news_upstream(&self) -> &str {
        self.news_upstream
            .as_deref()
            .unwrap_or(DEFAULT_NEWS_UPSTREAM)
    }

    /// Users service base URL.
    #[must_use]
    pub fn users_upstream(&self) -> &str {
        self.users_upstream
            .as_deref()
            .unwrap_or(DEFAULT_USERS_UPSTREAM)
    }
}
