//! Driving adapters: the REST API and the event bus consumers.

pub mod events;
pub mod http;
