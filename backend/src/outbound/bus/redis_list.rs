//! Redis list-backed event bus.
//!
//! Publishing appends with `RPUSH`; reading pops with `BLPOP` and a short
//! server-side timeout so consumers regain control between polls. A popped
//! payload is gone: delivery is at most once, shared between every reader
//! of the topic.
//!
//! `BLPOP` runs on a dedicated connection whose response timeout outlasts the
//! server-side wait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis;
use bb8_redis::redis::aio::MultiplexedConnection;
use event_contracts::Topic;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::ports::{EventBusError, EventPublisher, EventSubscriber};
use crate::outbound::redis_pool::{RedisPool, RedisPoolError};

/// Seconds `BLPOP` waits before returning an empty poll.
pub const BLPOP_TIMEOUT_SECS: u64 = 1;

/// How long the reading connection waits for a `BLPOP` reply.
const BLPOP_RESPONSE_TIMEOUT: Duration = Duration::from_secs(BLPOP_TIMEOUT_SECS + 4);

/// Bus adapter over the shared Redis pool.
#[derive(Clone)]
pub struct RedisEventBus {
    pool: RedisPool,
    key_prefix: String,
    reader: Arc<Mutex<Option<MultiplexedConnection>>>,
}

impl RedisEventBus {
    /// Bus whose list keys are the topic names themselves.
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self::with_key_prefix(pool, String::new())
    }

    /// Bus whose list keys are `{prefix}{topic}`.
    pub fn with_key_prefix(pool: RedisPool, key_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
            reader: Arc::new(Mutex::new(None)),
        }
    }

    fn list_key(&self, topic: Topic) -> String {
        format!("{}{}", self.key_prefix, topic.as_str())
    }

    async fn reader_connection(&self) -> Result<MultiplexedConnection, EventBusError> {
        let mut slot = self.reader.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self
            .pool
            .dedicated_connection(BLPOP_RESPONSE_TIMEOUT)
            .await
            .map_err(pool_error)?;
        *slot = Some(conn.clone());
        Ok(conn)
    }

    async fn drop_reader_connection(&self) {
        self.reader.lock().await.take();
    }
}

fn pool_error(err: RedisPoolError) -> EventBusError {
    EventBusError::unavailable(err.to_string())
}

fn command_error(err: &redis::RedisError) -> EventBusError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
        EventBusError::unavailable(err.to_string())
    } else {
        EventBusError::rejected(err.to_string())
    }
}

#[async_trait]
impl EventPublisher for RedisEventBus {
    async fn publish(&self, topic: Topic, payload: String) -> Result<(), EventBusError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let length: u64 = redis::cmd("RPUSH")
            .arg(self.list_key(topic))
            .arg(payload)
            .query_async(&mut *conn)
            .await
            .map_err(|err| command_error(&err))?;
        debug!(%topic, queued = length, "payload pushed to redis");
        Ok(())
    }
}

#[async_trait]
impl EventSubscriber for RedisEventBus {
    async fn next_message(&self, topic: Topic) -> Result<Option<String>, EventBusError> {
        let mut conn = self.reader_connection().await?;
        let popped: Result<Option<(String, String)>, _> = redis::cmd("BLPOP")
            .arg(self.list_key(topic))
            .arg(BLPOP_TIMEOUT_SECS)
            .query_async(&mut conn)
            .await;
        match popped {
            Ok(popped) => Ok(popped.map(|(_key, payload)| payload)),
            Err(err) => {
                let mapped = command_error(&err);
                if matches!(mapped, EventBusError::Unavailable { .. }) {
                    warn!(%topic, error = %err, "dropping redis reader connection");
                    self.drop_reader_connection().await;
                }
                Err(mapped)
            }
        }
    }
}
