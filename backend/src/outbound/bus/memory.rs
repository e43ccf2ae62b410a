//! In-process event bus.
//!
//! Each topic is an unbounded queue: every payload is delivered to exactly
//! one reader, like the Redis list adapter. Suitable for tests and for
//! running both services inside one process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use event_contracts::Topic;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tracing::debug;

use crate::domain::ports::{EventBusError, EventPublisher, EventSubscriber};

/// Default time a reader waits before reporting an empty poll.
pub const DEFAULT_POLL_WINDOW: Duration = Duration::from_millis(100);

#[derive(Clone)]
struct TopicQueue {
    sender: mpsc::UnboundedSender<String>,
    receiver: Arc<AsyncMutex<mpsc::UnboundedReceiver<String>>>,
}

impl TopicQueue {
    fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(AsyncMutex::new(receiver)),
        }
    }
}

/// Queue-per-topic bus held in memory.
pub struct InMemoryEventBus {
    topics: Mutex<HashMap<Topic, TopicQueue>>,
    poll_window: Duration,
    published: AtomicU64,
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventBus {
    /// Bus with the default poll window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_poll_window(DEFAULT_POLL_WINDOW)
    }

    /// Bus whose readers wait at most `poll_window` per call.
    #[must_use]
    pub fn with_poll_window(poll_window: Duration) -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            poll_window,
            published: AtomicU64::new(0),
        }
    }

    /// Number of payloads accepted since creation.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    fn queue(&self, topic: Topic) -> TopicQueue {
        // A poisoned map still holds valid queues.
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        topics.entry(topic).or_insert_with(TopicQueue::new).clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, topic: Topic, payload: String) -> Result<(), EventBusError> {
        self.queue(topic)
            .sender
            .send(payload)
            .map_err(|err| EventBusError::rejected(err.to_string()))?;
        self.published.fetch_add(1, Ordering::Relaxed);
        debug!(%topic, "payload queued in memory");
        Ok(())
    }
}

#[async_trait]
impl EventSubscriber for InMemoryEventBus {
    async fn next_message(&self, topic: Topic) -> Result<Option<String>, EventBusError> {
        let queue = self.queue(topic);
        let mut receiver = queue.receiver.lock().await;
        match tokio::time::timeout(self.poll_window, receiver.recv()).await {
            Ok(Some(payload)) => Ok(Some(payload)),
            Ok(None) => Err(EventBusError::unavailable(format!("{topic} queue closed"))),
            Err(_elapsed) => Ok(None),
        }
    }
}
