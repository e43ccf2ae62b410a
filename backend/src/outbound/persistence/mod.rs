//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories only translate between row structs and domain types. Row
//! structs (`models.rs`) and the schema (`schema.rs`) stay private to this
//! module.
//!
//! ```ignore
//! use sportnews::outbound::persistence::{DbPool, DieselNewsRepository, PoolConfig};
//!
//! let pool = DbPool::connect(PoolConfig::new("postgres://localhost/news")).await?;
//! let repository = DieselNewsRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_news_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_news_repository::DieselNewsRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, MigrationSet, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
