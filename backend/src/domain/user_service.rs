//! User service: user CRUD and the registration counter.
//!
//! Processing a [`NewsProcessMessage`] bumps the named user's counter and
//! answers with a [`ConfirmationMessage`] carrying the news identifier.
//! Creating a user also emits a confirmation, keyed by the user identifier.

use std::sync::Arc;

use event_contracts::{ConfirmationMessage, NewsProcessMessage};
use mockable::Clock;
use tracing::{debug, error, info};

use super::events::publish_envelope;
use super::ports::{EventPublisher, UserRepository, UserRepositoryError};
use super::{Error, ObjectId, User, UserDraft};

/// User operations shared by the HTTP handlers and the registration
/// consumer.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Create a service over the given adapters.
    pub fn new(
        repository: Arc<dyn UserRepository>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            publisher,
            clock,
        }
    }

    /// Store a new user with a zero counter.
    ///
    /// A confirmation naming the new user and the current local time is
    /// published afterwards; failing to publish is logged only.
    ///
    /// # Errors
    /// Returns `Unprocessable` when the store fails.
    pub async fn create(&self, draft: UserDraft) -> Result<User, Error> {
        info!("creating user");
        let user = User::from_draft(draft);
        self.repository
            .insert(&user)
            .await
            .map_err(|err| repository_failure("insert user", &err))?;

        let confirmation =
            ConfirmationMessage::new(user.id.to_string(), self.clock.local().to_rfc3339());
        self.confirm(&confirmation).await;
        info!(user_id = %user.id, "created user");
        Ok(user)
    }

    /// User stored under `id`.
    ///
    /// # Errors
    /// Returns `NotFound` when no user exists and `Unprocessable` when the
    /// store fails.
    pub async fn get_by_id(&self, id: &ObjectId) -> Result<User, Error> {
        info!(user_id = %id, "fetching user");
        let user = self.require(id).await?;
        info!(user_id = %id, "fetched user");
        Ok(user)
    }

    /// Remove the user stored under `id`.
    ///
    /// # Errors
    /// Returns `NotFound` without touching the store when no user exists and
    /// `Unprocessable` when the store fails.
    pub async fn delete(&self, id: &ObjectId) -> Result<(), Error> {
        info!(user_id = %id, "deleting user");
        self.require(id).await?;
        self.repository
            .delete(id)
            .await
            .map_err(|err| repository_failure("delete user", &err))?;
        info!(user_id = %id, "deleted user");
        Ok(())
    }

    /// Register one news item against the user named in `message`.
    ///
    /// Increments the counter by one and publishes a confirmation carrying
    /// the inbound object identifier and the current UTC time.
    ///
    /// # Errors
    /// Returns `NotFound` when the user does not exist and `Unprocessable`
    /// when the user identifier cannot be read or the store fails.
    pub async fn process_news(&self, message: &NewsProcessMessage) -> Result<User, Error> {
        info!(
            object_id = %message.object_id,
            user_id = %message.user_id,
            "processing news registration"
        );
        let id: ObjectId = message.user_id.parse().map_err(|err| {
            error!(user_id = %message.user_id, error = %err, "registration names an invalid user id");
            Error::unprocessable(format!("user identifier {} is not valid", message.user_id))
        })?;
        let mut user = self.require(&id).await?;
        user.register_object();
        self.repository
            .update(&user)
            .await
            .map_err(|err| repository_failure("update user", &err))?;

        let confirmation =
            ConfirmationMessage::new(message.object_id.clone(), self.clock.utc().to_rfc3339());
        self.confirm(&confirmation).await;
        info!(
            user_id = %id,
            registered_objects = user.registered_objects,
            "news registration processed"
        );
        Ok(user)
    }

    async fn require(&self, id: &ObjectId) -> Result<User, Error> {
        let found = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|err| repository_failure("find user", &err))?;
        found.ok_or_else(|| {
            debug!(user_id = %id, "user not found");
            Error::not_found(format!("user with id {id} not found"))
        })
    }

    async fn confirm(&self, confirmation: &ConfirmationMessage) {
        if let Err(err) = publish_envelope(self.publisher.as_ref(), confirmation).await {
            error!(
                object_id = %confirmation.object_id,
                error = %err,
                "failed to publish confirmation"
            );
        }
    }
}

fn repository_failure(action: &str, err: &UserRepositoryError) -> Error {
    error!(error = %err, "failed to {action}");
    Error::unprocessable(format!("failed to {action}"))
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
