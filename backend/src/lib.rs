//! SportNews backend: the news service, the users service and the gateway.
//!
//! The two services share one library. Each binary wires the adapters it
//! needs from [`outbound`] into a domain service and exposes it through
//! [`inbound`].

pub mod config;
pub mod doc;
pub mod domain;
pub mod gateway;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use doc::{NewsApiDoc, UsersApiDoc};
pub use middleware::Trace;
