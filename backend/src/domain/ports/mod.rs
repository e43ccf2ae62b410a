//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (databases, the cache, the event bus). Each trait exposes strongly typed
//! errors so adapters map their failures into predictable variants.

mod macros;

mod event_bus;
mod news_cache;
mod news_repository;
mod user_repository;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use event_bus::{MockEventPublisher, MockEventSubscriber};
pub use event_bus::{EventBusError, EventPublisher, EventSubscriber};
#[cfg(test)]
pub use news_cache::MockNewsCache;
pub use news_cache::{NewsCache, NewsCacheError, NewsCacheKey};
#[cfg(test)]
pub use news_repository::MockNewsRepository;
pub use news_repository::{NewsRepository, NewsRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
