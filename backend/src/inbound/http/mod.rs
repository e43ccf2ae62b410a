//! HTTP inbound adapter exposing the REST endpoints of both services.

pub mod error;
pub mod health;
pub mod news;
pub mod users;

pub use error::ApiResult;
