//! Shared wiring for the HTTP and event integration tests.
//!
//! Each harness builds a real domain service over the in-memory adapters
//! from `sportnews::test_support`, keeping handles on the adapters so tests
//! can inspect store, cache and bus state directly.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use chrono::{DateTime, TimeZone, Utc};
use sportnews::domain::{NewsService, UserService};
use sportnews::inbound::http::health::HealthState;
use sportnews::outbound::bus::InMemoryEventBus;
use sportnews::test_support::{
    InMemoryNewsCache, InMemoryNewsRepository, InMemoryUserRepository, MutableClock,
};

/// Poll window short enough to keep consumer tests fast.
pub const POLL_WINDOW: Duration = Duration::from_millis(10);

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// Instant the users service clock is frozen at.
pub fn frozen_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 15, 11, 17, 5)
        .single()
        .expect("valid fixture instant")
}

/// Bus shared by both services in end-to-end tests.
pub fn shared_bus() -> Arc<InMemoryEventBus> {
    Arc::new(InMemoryEventBus::with_poll_window(POLL_WINDOW))
}

/// News service over in-memory adapters.
pub struct NewsHarness {
    pub repository: Arc<InMemoryNewsRepository>,
    pub cache: Arc<InMemoryNewsCache>,
    pub bus: Arc<InMemoryEventBus>,
    pub service: NewsService,
}

impl NewsHarness {
    pub fn new() -> Self {
        Self::with_bus(shared_bus())
    }

    pub fn with_bus(bus: Arc<InMemoryEventBus>) -> Self {
        let repository = Arc::new(InMemoryNewsRepository::new());
        let cache = Arc::new(InMemoryNewsCache::new());
        let service = NewsService::new(repository.clone(), cache.clone(), bus.clone());
        Self {
            repository,
            cache,
            bus,
            service,
        }
    }

    pub fn data(&self) -> web::Data<NewsService> {
        web::Data::new(self.service.clone())
    }
}

/// Users service over in-memory adapters with a frozen clock.
pub struct UsersHarness {
    pub repository: Arc<InMemoryUserRepository>,
    pub bus: Arc<InMemoryEventBus>,
    pub clock: Arc<MutableClock>,
    pub service: UserService,
}

impl UsersHarness {
    pub fn new() -> Self {
        Self::with_bus(shared_bus())
    }

    pub fn with_bus(bus: Arc<InMemoryEventBus>) -> Self {
        let repository = Arc::new(InMemoryUserRepository::new());
        let clock = Arc::new(MutableClock::new(frozen_now()));
        let service = UserService::new(repository.clone(), bus.clone(), clock.clone());
        Self {
            repository,
            bus,
            clock,
            service,
        }
    }

    pub fn data(&self) -> web::Data<UserService> {
        web::Data::new(self.service.clone())
    }
}

/// Health state already marked ready.
pub fn ready_health() -> web::Data<HealthState> {
    let state = web::Data::new(HealthState::new());
    state.mark_ready();
    state
}
