//! Event bus adapters: Redis lists in production, in-memory queues for tests
//! and single-process runs.

mod memory;
mod redis_list;

pub use memory::{DEFAULT_POLL_WINDOW, InMemoryEventBus};
pub use redis_list::{BLPOP_TIMEOUT_SECS, RedisEventBus};
