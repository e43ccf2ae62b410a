//! Publishing typed envelopes through the bus port.

use event_contracts::{Envelope, EnvelopeError};
use thiserror::Error;

use super::ports::{EventBusError, EventPublisher};

/// Failure to hand an envelope to the bus.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The envelope could not be serialised.
    #[error(transparent)]
    Encode(#[from] EnvelopeError),
    /// The bus refused or could not take the payload.
    #[error(transparent)]
    Bus(#[from] EventBusError),
}

/// Encode `envelope` and publish it on its topic.
///
/// # Errors
/// Returns [`PublishError`] when encoding or publishing fails.
pub async fn publish_envelope<E>(
    publisher: &dyn EventPublisher,
    envelope: &E,
) -> Result<(), PublishError>
where
    E: Envelope + Sync,
{
    let payload = envelope.encode()?;
    publisher.publish(E::TOPIC, payload).await?;
    Ok(())
}
