//! Domain primitives, services and ports.
//!
//! Purpose: define the news and user aggregates, the two services that own
//! them, and the ports through which they reach storage, the cache and the
//! event bus. Nothing here depends on actix, Diesel or Redis.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failures.
//! - News / NewsDraft and User / UserDraft: aggregates and their inputs.
//! - ObjectId: 24-hex identifier shared by both aggregates.
//! - NewsService / UserService: operations used by HTTP and consumers.
//! - TraceId: per-request or per-message correlation identifier.

pub mod error;
pub mod events;
pub mod news;
pub mod news_service;
pub mod object_id;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::error::{Error, ErrorCode};
pub use self::events::{PublishError, publish_envelope};
pub use self::news::{News, NewsDraft, TimestampParseError, parse_confirmation_timestamp};
pub use self::news_service::{NewsService, PLACEHOLDER_USER_ID};
pub use self::object_id::{ObjectId, ObjectIdError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{User, UserDraft};
pub use self::user_service::UserService;
