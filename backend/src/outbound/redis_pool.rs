//! Shared `bb8` pool of Redis connections.
//!
//! The cache and the event bus each hold a clone of the same pool. Pooled
//! connections use the driver's default response timeout, so blocking reads
//! take a dedicated connection instead.

use std::time::Duration;

use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::aio::MultiplexedConnection;
use bb8_redis::redis::{AsyncConnectionConfig, Client};

/// Failures building or using the Redis pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedisPoolError {
    /// The URL was rejected or the initial connections failed.
    #[error("failed to build redis pool: {message}")]
    Build {
        /// Driver message.
        message: String,
    },
    /// No connection became available in time.
    #[error("failed to get redis connection: {message}")]
    Checkout {
        /// Driver message.
        message: String,
    },
    /// A dedicated connection could not be opened.
    #[error("failed to open redis connection: {message}")]
    Connect {
        /// Driver message.
        message: String,
    },
}

/// Cloneable handle to the Redis pool.
#[derive(Clone)]
pub struct RedisPool {
    inner: Pool<RedisConnectionManager>,
    client: Client,
}

impl RedisPool {
    /// Connect to `url` with at most `max_size` connections.
    ///
    /// # Errors
    /// Returns [`RedisPoolError::Build`] when the URL is invalid or the
    /// server cannot be reached.
    pub async fn connect(url: &str, max_size: u32) -> Result<Self, RedisPoolError> {
        let build_error = |err: bb8_redis::redis::RedisError| RedisPoolError::Build {
            message: err.to_string(),
        };
        let client = Client::open(url).map_err(build_error)?;
        let manager = RedisConnectionManager::new(url).map_err(build_error)?;
        let inner = Pool::builder()
            .max_size(max_size)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .await
            .map_err(build_error)?;
        Ok(Self { inner, client })
    }

    /// Check out a connection.
    ///
    /// # Errors
    /// Returns [`RedisPoolError::Checkout`] when none is available in time.
    pub async fn get(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, RedisPoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| RedisPoolError::Checkout {
                message: err.to_string(),
            })
    }

    /// Open a connection outside the pool that waits up to
    /// `response_timeout` for each reply.
    ///
    /// # Errors
    /// Returns [`RedisPoolError::Connect`] when the server cannot be reached.
    pub async fn dedicated_connection(
        &self,
        response_timeout: Duration,
    ) -> Result<MultiplexedConnection, RedisPoolError> {
        let config = AsyncConnectionConfig::new().set_response_timeout(Some(response_timeout));
        self.client
            .get_multiplexed_async_connection_with_config(&config)
            .await
            .map_err(|err| RedisPoolError::Connect {
                message: err.to_string(),
            })
    }
}
