//! News service consumer of `confirmation_topic`.

use async_trait::async_trait;
use event_contracts::{ConfirmationMessage, Envelope, Topic};

use crate::domain::NewsService;

use super::{MessageHandler, MessageProcessingError};

/// Sets the publish timestamp of the news item named by each confirmation.
#[derive(Clone)]
pub struct ConfirmationHandler {
    service: NewsService,
}

impl ConfirmationHandler {
    /// Handler applying confirmations through `service`.
    #[must_use]
    pub const fn new(service: NewsService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for ConfirmationHandler {
    fn topic(&self) -> Topic {
        ConfirmationMessage::TOPIC
    }

    async fn handle(&self, payload: &str) -> Result<(), MessageProcessingError> {
        let message = ConfirmationMessage::decode(payload)?;
        self.service.apply_confirmation(&message).await?;
        Ok(())
    }
}
