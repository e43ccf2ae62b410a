//! Users service consumer of `object_service_topic`.

use async_trait::async_trait;
use event_contracts::{Envelope, NewsProcessMessage, Topic};

use crate::domain::UserService;

use super::{MessageHandler, MessageProcessingError};

/// Registers each created news item against the user it names.
#[derive(Clone)]
pub struct RegistrationHandler {
    service: UserService,
}

impl RegistrationHandler {
    /// Handler processing registrations through `service`.
    #[must_use]
    pub const fn new(service: UserService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for RegistrationHandler {
    fn topic(&self) -> Topic {
        NewsProcessMessage::TOPIC
    }

    async fn handle(&self, payload: &str) -> Result<(), MessageProcessingError> {
        let message = NewsProcessMessage::decode(payload)?;
        self.service.process_news(&message).await?;
        Ok(())
    }
}
