//! Ports for the topic-based event bus shared by both services.
//!
//! Payloads cross the port as JSON text; the envelope types live in the
//! `event-contracts` crate so both services agree on the wire shape.

use async_trait::async_trait;
use event_contracts::Topic;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by bus adapters.
    pub enum EventBusError {
        /// Bus infrastructure is unreachable.
        Unavailable { message: String } => "event bus is unavailable: {message}",
        /// The bus refused the operation.
        Rejected { message: String } => "event bus rejected the operation: {message}",
    }
}

/// Write side of the bus.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Append `payload` to `topic`. Delivery is at most once.
    async fn publish(&self, topic: Topic, payload: String) -> Result<(), EventBusError>;
}

/// Read side of the bus.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Wait a bounded time for the next payload on `topic`.
    ///
    /// Returns `Ok(None)` when nothing arrived within the adapter's poll
    /// window so callers can check for cancellation between polls.
    async fn next_message(&self, topic: Topic) -> Result<Option<String>, EventBusError>;
}
