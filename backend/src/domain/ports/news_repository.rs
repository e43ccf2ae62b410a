//! Port for news item persistence.

use async_trait::async_trait;

use crate::domain::{News, ObjectId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by news repository adapters.
    pub enum NewsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "news repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "news repository query failed: {message}",
    }
}

/// CRUD access to the news collection.
///
/// Mutations do not check for existence; callers look the item up first
/// when a missing item must be reported.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Every stored item, in no particular order.
    async fn list_all(&self) -> Result<Vec<News>, NewsRepositoryError>;

    /// Item stored under `id`, if any.
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<News>, NewsRepositoryError>;

    /// Store a new item.
    async fn insert(&self, news: &News) -> Result<(), NewsRepositoryError>;

    /// Replace every field of the item stored under `news.id`.
    async fn update(&self, news: &News) -> Result<(), NewsRepositoryError>;

    /// Remove the item stored under `id`.
    async fn delete(&self, id: &ObjectId) -> Result<(), NewsRepositoryError>;

    /// Remove every item.
    async fn delete_all(&self) -> Result<(), NewsRepositoryError>;
}
