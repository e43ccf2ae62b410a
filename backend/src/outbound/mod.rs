//! Driven adapters implementing the domain ports.
//!
//! - `persistence`: Diesel repositories for news and users.
//! - `cache`: Redis-backed and disabled news caches.
//! - `bus`: Redis list and in-memory event buses.
//! - `redis_pool`: the `bb8` pool shared by the cache and the bus.

pub mod bus;
pub mod cache;
pub mod persistence;
pub mod redis_pool;
