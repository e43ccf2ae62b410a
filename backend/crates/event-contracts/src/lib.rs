//! Event contracts shared by the news and users services.
//!
//! Both services exchange JSON envelopes over two named topics. The envelope
//! field names are `PascalCase` on the wire (`ObjectId`, `UserId`,
//! `ConfirmationTimestamp`); decoding also accepts `camelCase` spellings so
//! hand-written HTTP payloads behave the same as bus traffic.
//!
//! # Examples
//! ```
//! use event_contracts::{ConfirmationMessage, Envelope, Topic};
//!
//! let message = ConfirmationMessage::new("65f1c0ffee0000000000abcd", "2024-05-01T10:00:00Z");
//! let json = message.encode().expect("encode");
//! assert!(json.contains("\"ConfirmationTimestamp\""));
//! assert_eq!(ConfirmationMessage::TOPIC, Topic::Confirmation);
//! ```

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named channels carried by the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// News creation requests travelling from the news service to users.
    ObjectService,
    /// Confirmations travelling from the users service back to news.
    Confirmation,
}

impl Topic {
    /// Wire name of the topic.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ObjectService => "object_service_topic",
            Self::Confirmation => "confirmation_topic",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures raised while encoding or decoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Payload was not valid JSON for the expected envelope.
    #[error("failed to decode {topic} envelope: {source}")]
    Decode {
        /// Topic the payload was read from.
        topic: Topic,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Envelope could not be serialised.
    #[error("failed to encode {topic} envelope: {source}")]
    Encode {
        /// Topic the envelope was meant for.
        topic: Topic,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// An envelope bound to the topic it travels on.
pub trait Envelope: Serialize + DeserializeOwned {
    /// Topic this envelope is published to.
    const TOPIC: Topic;

    /// Serialise the envelope to its JSON wire form.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Encode`] if serialisation fails.
    fn encode(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(|source| EnvelopeError::Encode {
            topic: Self::TOPIC,
            source,
        })
    }

    /// Parse an envelope from its JSON wire form.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Decode`] when the payload is not valid JSON or
    /// is JSON `null`.
    fn decode(payload: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(payload).map_err(|source| EnvelopeError::Decode {
            topic: Self::TOPIC,
            source,
        })
    }
}

/// Request asking the users service to register a news item for a user.
///
/// Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NewsProcessMessage {
    /// Identifier of the news item.
    #[serde(alias = "objectId")]
    pub object_id: String,
    /// Identifier of the user whose counter is incremented.
    #[serde(alias = "userId")]
    pub user_id: String,
}

impl NewsProcessMessage {
    /// Build a creation envelope.
    #[must_use]
    pub fn new(object_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            user_id: user_id.into(),
        }
    }
}

impl Envelope for NewsProcessMessage {
    const TOPIC: Topic = Topic::ObjectService;
}

/// Confirmation that an object was processed, carrying a date-time string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConfirmationMessage {
    /// Identifier of the confirmed object.
    #[serde(alias = "objectId")]
    pub object_id: String,
    /// Confirmation time as a parseable date-time string.
    #[serde(alias = "confirmationTimestamp")]
    pub confirmation_timestamp: String,
}

impl ConfirmationMessage {
    /// Build a confirmation envelope.
    #[must_use]
    pub fn new(object_id: impl Into<String>, confirmation_timestamp: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            confirmation_timestamp: confirmation_timestamp.into(),
        }
    }
}

impl Envelope for ConfirmationMessage {
    const TOPIC: Topic = Topic::Confirmation;
}
