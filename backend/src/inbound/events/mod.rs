//! Event bus inbound adapter: one background consumer per service.
//!
//! A consumer polls a single topic, hands each payload to a
//! [`MessageHandler`] and moves on. Failures never stop the loop: malformed
//! payloads and lookup misses are dropped with a warning, everything else is
//! logged as an error. The loop checks its cancellation token between polls
//! and is joined through [`ConsumerHandle::shutdown`].

mod confirmation;
mod registration;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use event_contracts::{EnvelopeError, Topic};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

use crate::domain::ports::EventSubscriber;
use crate::domain::{Error, ErrorCode, TraceId};

pub use confirmation::ConfirmationHandler;
pub use registration::RegistrationHandler;

/// Pause after the bus reports a failure, before polling again.
pub const BUS_FAILURE_BACKOFF: Duration = Duration::from_secs(1);

/// Why a consumed message had no effect.
#[derive(Debug, Error)]
pub enum MessageProcessingError {
    /// The payload was not a valid envelope.
    #[error(transparent)]
    Malformed(#[from] EnvelopeError),
    /// The operation the message triggers failed.
    #[error("{0}")]
    Operation(#[from] Error),
}

impl MessageProcessingError {
    /// Whether the message should be dropped quietly rather than reported as
    /// a failure.
    #[must_use]
    pub fn is_drop(&self) -> bool {
        match self {
            Self::Malformed(_) => true,
            Self::Operation(err) => err.code() == ErrorCode::NotFound,
        }
    }
}

/// Processes payloads from one topic.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Topic this handler consumes.
    fn topic(&self) -> Topic;

    /// Apply one payload.
    async fn handle(&self, payload: &str) -> Result<(), MessageProcessingError>;
}

/// Running consumer task.
pub struct ConsumerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl ConsumerHandle {
    /// Token that stops the consumer when cancelled.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the consumer and wait for its current message to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(err) = self.task.await {
            error!(error = %err, "consumer task ended abnormally");
        }
    }
}

/// Spawn the consumption loop for `handler`.
///
/// The loop stops once `token` is cancelled.
pub fn spawn_consumer(
    subscriber: Arc<dyn EventSubscriber>,
    handler: Arc<dyn MessageHandler>,
    token: CancellationToken,
) -> ConsumerHandle {
    let loop_token = token.clone();
    let task = tokio::spawn(async move {
        let topic = handler.topic();
        info!(%topic, "consumer started");
        while !loop_token.is_cancelled() {
            let polled = tokio::select! {
                () = loop_token.cancelled() => break,
                polled = subscriber.next_message(topic) => polled,
            };
            match polled {
                Ok(Some(payload)) => dispatch(handler.as_ref(), topic, &payload).await,
                Ok(None) => {}
                Err(err) => {
                    error!(%topic, error = %err, "failed to read from event bus");
                    tokio::select! {
                        () = loop_token.cancelled() => break,
                        () = tokio::time::sleep(BUS_FAILURE_BACKOFF) => {}
                    }
                }
            }
        }
        info!(%topic, "consumer stopped");
    });
    ConsumerHandle { token, task }
}

async fn dispatch(handler: &dyn MessageHandler, topic: Topic, payload: &str) {
    let trace_id = TraceId::generate();
    let span = info_span!("consume", %topic, %trace_id);
    let outcome = TraceId::scope(trace_id, async {
        info!(payload, "message received");
        handler.handle(payload).await
    })
    .instrument(span.clone())
    .await;

    let _entered = span.enter();
    match outcome {
        Ok(()) => info!("message processed"),
        Err(err) if err.is_drop() => warn!(error = %err, "message dropped"),
        Err(err) => error!(error = %err, "message processing failed"),
    }
}
