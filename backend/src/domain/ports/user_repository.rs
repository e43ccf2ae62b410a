//! Port for user persistence.

use async_trait::async_trait;

use crate::domain::{ObjectId, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// CRUD access to the users collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// User stored under `id`, if any.
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, UserRepositoryError>;

    /// Replace the stored user with the same identifier.
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Remove the user stored under `id`.
    async fn delete(&self, id: &ObjectId) -> Result<(), UserRepositoryError>;
}
