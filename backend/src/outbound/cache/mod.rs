//! News cache adapters.
//!
//! [`RedisNewsCache`] stores entries as plain Redis strings under
//! `{instance}{key}` with no expiry. [`DisabledNewsCache`] always misses and
//! discards writes; it is wired in when caching is switched off.

use async_trait::async_trait;
use bb8_redis::redis;

use crate::domain::ports::{NewsCache, NewsCacheError, NewsCacheKey};

use super::redis_pool::RedisPool;

/// Redis-backed cache.
#[derive(Clone)]
pub struct RedisNewsCache {
    pool: RedisPool,
    instance: String,
}

impl RedisNewsCache {
    /// Create a cache whose keys are prefixed with `instance`.
    pub fn new(pool: RedisPool, instance: impl Into<String>) -> Self {
        Self {
            pool,
            instance: instance.into(),
        }
    }

    fn redis_key(&self, key: &NewsCacheKey) -> String {
        format!("{}{}", self.instance, key)
    }
}

fn backend_error(err: impl std::fmt::Display) -> NewsCacheError {
    NewsCacheError::backend(err.to_string())
}

#[async_trait]
impl NewsCache for RedisNewsCache {
    async fn get(&self, key: &NewsCacheKey) -> Result<Option<String>, NewsCacheError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        redis::cmd("GET")
            .arg(self.redis_key(key))
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)
    }

    async fn set(&self, key: &NewsCacheKey, value: String) -> Result<(), NewsCacheError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        redis::cmd("SET")
            .arg(self.redis_key(key))
            .arg(value)
            .query_async::<()>(&mut *conn)
            .await
            .map_err(backend_error)
    }

    async fn remove(&self, key: &NewsCacheKey) -> Result<(), NewsCacheError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        redis::cmd("DEL")
            .arg(self.redis_key(key))
            .query_async::<()>(&mut *conn)
            .await
            .map_err(backend_error)
    }
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNewsCache;

#[async_trait]
impl NewsCache for DisabledNewsCache {
    async fn get(&self, _key: &NewsCacheKey) -> Result<Option<String>, NewsCacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &NewsCacheKey, _value: String) -> Result<(), NewsCacheError> {
        Ok(())
    }

    async fn remove(&self, _key: &NewsCacheKey) -> Result<(), NewsCacheError> {
        Ok(())
    }
}
